use std::path::{Path, PathBuf};

use supplychain_state::world_state::root_at;

pub const PEER_SOCKET: &str = "peer.sock";

/// `<home>/.supplychain/peer.sock`
pub fn socket_path(home: &Path) -> PathBuf {
    root_at(home).join(PEER_SOCKET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_lives_beside_the_state_directory() {
        let home = Path::new("/home/alice");
        assert_eq!(
            socket_path(home),
            PathBuf::from("/home/alice/.supplychain/peer.sock")
        );
        assert_eq!(
            socket_path(home).parent(),
            supplychain_state::world_state::state_dir_at(home).parent()
        );
    }
}

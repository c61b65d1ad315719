//! Name + string-args invocation surface.
//!
//! The platform submits a function name and positional string arguments; the
//! result travels back as bytes. Mutations return an empty payload, reads
//! return JSON.

use std::fmt;
use std::str::FromStr;

use crate::context::TransactionContext;
use crate::contract::SupplyChainContract;
use crate::error::ContractError;

/// Functions exported by the contract, under their platform names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    InitLedger,
    CreateProduct,
    UpdateProduct,
    TransferOwnership,
    QueryProduct,
    GetAllProducts,
    ProductExists,
}

impl Function {
    pub const ALL: [Function; 7] = [
        Function::InitLedger,
        Function::CreateProduct,
        Function::UpdateProduct,
        Function::TransferOwnership,
        Function::QueryProduct,
        Function::GetAllProducts,
        Function::ProductExists,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Function::InitLedger => "InitLedger",
            Function::CreateProduct => "CreateProduct",
            Function::UpdateProduct => "UpdateProduct",
            Function::TransferOwnership => "TransferOwnership",
            Function::QueryProduct => "QueryProduct",
            Function::GetAllProducts => "GetAllProducts",
            Function::ProductExists => "ProductExists",
        }
    }

    /// Number of string arguments the function takes.
    pub fn arity(self) -> usize {
        match self {
            Function::InitLedger | Function::GetAllProducts => 0,
            Function::QueryProduct | Function::ProductExists => 1,
            Function::TransferOwnership => 2,
            Function::CreateProduct | Function::UpdateProduct => 5,
        }
    }

    /// Read-only calls are evaluated; their write set is never committed.
    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            Function::QueryProduct | Function::GetAllProducts | Function::ProductExists
        )
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Function {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Function::ALL
            .into_iter()
            .find(|function| function.name() == s)
            .ok_or_else(|| ContractError::UnknownFunction(s.to_string()))
    }
}

impl SupplyChainContract {
    /// Route one invocation to the matching operation.
    pub fn invoke(
        &self,
        ctx: &mut TransactionContext<'_>,
        function: Function,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError> {
        if args.len() != function.arity() {
            return Err(ContractError::InvalidArguments {
                function: function.name(),
                expected: function.arity(),
                actual: args.len(),
            });
        }
        let a: Vec<&str> = args.iter().map(String::as_str).collect();

        match function {
            Function::InitLedger => self.init_ledger(ctx).map(|()| Vec::new()),
            Function::CreateProduct => self
                .create_product(ctx, a[0], a[1], a[2], a[3], a[4])
                .map(|()| Vec::new()),
            Function::UpdateProduct => self
                .update_product(ctx, a[0], a[1], a[2], a[3], a[4])
                .map(|()| Vec::new()),
            Function::TransferOwnership => self
                .transfer_ownership(ctx, a[0], a[1])
                .map(|()| Vec::new()),
            Function::QueryProduct => {
                let product = self.query_product(ctx, a[0])?;
                encode_payload(a[0], &product)
            }
            Function::GetAllProducts => {
                let products = self.get_all_products(ctx)?;
                encode_payload("*", &products)
            }
            Function::ProductExists => {
                let exists = self.product_exists(ctx, a[0])?;
                encode_payload(a[0], &exists)
            }
        }
    }

    /// Parse `function` and route it; see [`SupplyChainContract::invoke`].
    pub fn invoke_by_name(
        &self,
        ctx: &mut TransactionContext<'_>,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError> {
        self.invoke(ctx, function.parse()?, args)
    }
}

fn encode_payload<T: serde::Serialize + ?Sized>(
    id: &str,
    value: &T,
) -> Result<Vec<u8>, ContractError> {
    serde_json::to_vec(value).map_err(|e| ContractError::SerializationFailure {
        id: id.to_string(),
        source: e,
    })
}

/// Central registry of all symbols, scopes, and packages in a program
mod scope;
mod symbol;
mod table;
mod types;

pub use scope::Scope;
pub use symbol::{
    ArrayLen, ChanDir, Occurrence, PackageId, PendingRef, ScopeId, Symbol, SymbolId, SymbolKind,
};
pub use table::SymbolTable;
pub use types::CycleError;

#[cfg(test)]
mod tests;

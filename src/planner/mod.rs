pub mod error;
pub mod expression;
pub mod parser;
pub mod statement;

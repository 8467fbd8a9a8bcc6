use crate::{
    executor::{ExecutionContext, QueryOutput},
    types::error::Result,
};

/// One (Field, Type, Constraints) row per column, in declaration order.
pub fn describe_table(ctx: &ExecutionContext<'_>, table: &str) -> Result<QueryOutput> {
    let schema = ctx.open_table(table)?.schema()?;
    Ok(QueryOutput::Listing {
        headers: vec![
            "Field".to_string(),
            "Type".to_string(),
            "Constraints".to_string(),
        ],
        rows: schema
            .columns
            .iter()
            .map(|column| {
                vec![
                    column.name.clone(),
                    column.type_text.clone(),
                    column.constraint_text.clone(),
                ]
            })
            .collect(),
    })
}

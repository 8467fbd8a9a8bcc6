use crate::{
    executor::{ExecutionContext, QueryOutput},
    types::error::Result,
};

pub fn show_databases(ctx: &ExecutionContext<'_>) -> Result<QueryOutput> {
    Ok(QueryOutput::Listing {
        headers: vec!["Database".to_string()],
        rows: ctx
            .catalog
            .list_databases()
            .into_iter()
            .map(|name| vec![name])
            .collect(),
    })
}

/// Tables of the current database, under a header naming that database.
pub fn show_tables(ctx: &ExecutionContext<'_>) -> Result<QueryOutput> {
    let database = ctx.current_database()?;
    let tables = ctx.catalog.list_tables(&database);
    Ok(QueryOutput::Listing {
        headers: vec![database],
        rows: tables.into_iter().map(|name| vec![name]).collect(),
    })
}

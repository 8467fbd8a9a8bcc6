use crate::{
    executor::{ExecutionContext, QueryOutput},
    types::error::{DatabaseError, Result},
};

/// `USE <database>`: switches the session's current database.
pub fn use_database(ctx: &mut ExecutionContext<'_>, name: &str) -> Result<QueryOutput> {
    if !ctx.catalog.set_current_database(ctx.session, name) {
        return Err(DatabaseError::DatabaseNotFound {
            name: name.to_string(),
        });
    }
    let current = ctx.current_database()?;
    Ok(QueryOutput::ok(format!("database changed to '{}'", current)))
}

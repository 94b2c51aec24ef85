use crate::error::Error;

/// Reject an empty identifier before anything goes on the wire.
pub(crate) fn require(value: &str, name: &'static str) -> Result<(), Error> {
    if value.is_empty() {
        return Err(Error::invalid_argument(name));
    }
    Ok(())
}

use mongodb::bson::oid::ObjectId;
use std::fmt::Display;

/// Identifier of a stored document. The string form is the hex
/// representation of the underlying `ObjectId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ID(ObjectId);

impl ID {
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn from(oid: ObjectId) -> Self {
        Self(oid)
    }

    pub fn as_string(&self) -> String {
        self.0.to_hex()
    }

    pub fn inner(self) -> ObjectId {
        self.0
    }

    pub fn inner_ref(&self) -> &ObjectId {
        &self.0
    }
}

impl Default for ID {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_uses_hex_form_of_object_id() {
        let oid = ObjectId::new();
        let id = ID::from(oid);
        assert_eq!(id.as_string(), oid.to_hex());
        assert_eq!(id.to_string().len(), 24);
        assert!(id.to_string().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id.inner(), oid);
    }

    #[test]
    fn it_creates_unique_ids() {
        assert_ne!(ID::new(), ID::new());
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(PartialEq, Eq, Hash, Clone, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// A fresh random identifier. Never derived from a sequence, so ids minted by
            /// different processes or backends cannot collide.
            pub fn generate() -> Self { $name(Uuid::new_v4().to_string()) }

            pub fn as_str(&self) -> &str { &self.0 }

            pub fn into_inner(self) -> String { self.0 }

            pub fn is_empty(&self) -> bool { self.0.is_empty() }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}({})", stringify!($name), self.0) }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self { $name(id) }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self { $name(id.to_owned()) }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self { $name(id.to_string()) }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str { &self.0 }
        }
    };
}

define_id!(
    /// Identity of a ticket option (the inventory record)
    TicketOptionId
);
define_id!(
    /// Identity of a single fulfilled purchase
    PurchaseId
);
define_id!(
    /// Identity of one individually addressable ticket
    TicketId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_unique() {
        let ids: HashSet<TicketId> = (0..1000).map(|_| TicketId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn ids_are_opaque_strings() {
        let id = TicketOptionId::from("not-a-uuid");
        assert_eq!(id.as_str(), "not-a-uuid");
        assert_eq!(id.to_string(), "not-a-uuid");
        assert_eq!(format!("{id:?}"), "TicketOptionId(not-a-uuid)");

        let generated = PurchaseId::generate();
        assert!(Uuid::parse_str(generated.as_str()).is_ok());
    }
}

//! Typed handles into the configuration arena and the flow task table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Arena handles pair a slot index with the generation the slot had when
/// the node was inserted. A handle to a removed node never aliases the
/// node that later reuses its slot.
macro_rules! node_id {
    ($name:ident, $label:literal, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        pub struct $name {
            index: usize,
            generation: u64,
        }

        impl $name {
            /// Build a handle from its arena slot and generation.
            pub fn new(index: usize, generation: u64) -> Self {
                Self { index, generation }
            }

            /// Arena slot.
            pub fn index(&self) -> usize {
                self.index
            }

            /// Generation stamped at insertion.
            pub fn generation(&self) -> u64 {
                self.generation
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}.{}", $label, self.index, self.generation)
            }
        }
    };
}

node_id!(ContainerId, "container", "Handle to a container node.");
node_id!(ConfigurationId, "configuration", "Handle to a configuration node.");
node_id!(
    ExecutionContextId,
    "execution-context",
    "Handle to an execution context node."
);

/// Opaque handle for one parallel dispatch batch.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskHandle(u64);

impl TaskHandle {
    /// Wrap a raw task number.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw task number.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generations_distinguish_reused_slots() {
        let old = ConfigurationId::new(3, 1);
        let new = ConfigurationId::new(3, 2);
        assert_ne!(old, new);
        assert_eq!(old.index(), new.index());
        assert_eq!(new.to_string(), "configuration#3.2");
    }

    #[test]
    fn task_handle_is_transparent() {
        let json = serde_json::to_string(&TaskHandle::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}

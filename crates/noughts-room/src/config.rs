//! Room configuration.

/// Default command channel size for room actors.
pub const DEFAULT_COMMAND_CAPACITY: usize = 64;

/// Settings shared by every room a registry creates.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Bound of each room's command channel. Callers wait for capacity
    /// when a room is busy.
    pub command_capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            command_capacity: DEFAULT_COMMAND_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(RoomConfig::default().command_capacity, 64);
    }
}

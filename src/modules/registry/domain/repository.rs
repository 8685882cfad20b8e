/// Repository trait for the shared key/value registry
///
/// Keys are '/'-joined absolute paths. Implementations must be linearizable
/// for single-key operations and must surface transport failures as
/// `ScalingError::RegistryUnavailable`, never as an absent value.
use crate::shared::errors::ScalingResult;
use async_trait::async_trait;

#[async_trait]
pub trait RegistryRepository: Send + Sync {
    /// Read the value stored at `key`; `None` when nothing is stored
    async fn get(&self, key: &str) -> ScalingResult<Option<String>>;

    /// Create or overwrite the value at `key`
    async fn persist(&self, key: &str, value: &str) -> ScalingResult<()>;

    /// Delete `key` and every key below it. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> ScalingResult<()>;

    /// Names (last path segment only) of the immediate children of `key`
    async fn get_children_keys(&self, key: &str) -> ScalingResult<Vec<String>>;
}

//! Ordered multi-host deletion.

use tracing::info;

use crate::directory::HostDirectory;
use crate::errors::BatchDeleteError;

/// Delete `names` one at a time, in order, stopping at the first failure.
///
/// Returns how many hosts were deleted. On failure the error records how
/// many were deleted before it and which name failed; later names are not
/// attempted.
pub async fn delete_batch<D, I, S>(directory: &D, names: I) -> Result<usize, BatchDeleteError>
where
    D: HostDirectory + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut deleted = 0;
    for name in names {
        let name = name.as_ref();
        directory
            .delete(name)
            .await
            .map_err(|source| BatchDeleteError {
                deleted,
                name: name.to_string(),
                source,
            })?;
        deleted += 1;
    }
    info!(deleted, "batch delete finished");
    Ok(deleted)
}

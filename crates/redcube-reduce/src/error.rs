use redcube_common::LayoutError;
use redcube_runtime::DeviceError;
use thiserror::Error;

/// Errors returned by the reduce launchers.
#[derive(Error, Debug)]
pub enum ReduceError {
    /// The opcode has no entry in the instruction table.
    #[error("Unsupported reduce opcode {0}")]
    UnsupportedOpCode(i32),

    /// The tensor layout doesn't allow the requested reduction.
    #[error("Invalid tensor layout\nCaused by:\n  {0}")]
    Layout(#[from] LayoutError),

    /// A device call failed.
    #[error("A device error happened during the reduction\nCaused by:\n  {0}")]
    Device(#[from] DeviceError),
}

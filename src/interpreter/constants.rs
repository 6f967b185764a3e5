// Constants for the embedded Forth module

/// Size of the output accumulator at the bottom of linear memory.
/// At most `OUTPUT_CAPACITY - 1` bytes are stored; the last byte holds the NUL.
pub const OUTPUT_CAPACITY: usize = 8192;

/// Start of data space, right after the output accumulator
pub const DATA_START: u32 = OUTPUT_CAPACITY as u32;

/// The `base` variable lives in the first cell of data space
pub const BASE_ADDR: u32 = DATA_START;

/// Bytes reserved at the top of linear memory for transient host buffers
pub const SCRATCH_SIZE: usize = 16 * 1024;

/// Smallest data space worth instantiating a module for
pub const MIN_DATA_SPACE: usize = 4 * 1024;

/// Default linear memory size
pub const DEFAULT_MEMORY_BYTES: usize = 256 * 1024;

/// Dictionary cells charged for each word header
pub const HEADER_CELLS: usize = 3;

/// Nesting limit for colon definitions calling each other
pub const MAX_CALL_DEPTH: usize = 1024;

/// `evaluate` ran to the end of its input
pub const VM_OUTOFTEXT: i32 = crate::module::status::OUT_OF_TEXT;

/// `evaluate` stopped on an error; the message is in the output accumulator
pub const VM_ERREXIT: i32 = crate::module::status::ERROR_EXIT;

pub const VERSION_BANNER: &str = concat!("lampforth version ", env!("CARGO_PKG_VERSION"));

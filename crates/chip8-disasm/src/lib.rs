pub mod analyze;
pub mod model;

// Re-export commonly used types/functions for consumers
pub use analyze::{analyze_entries, build_cfg, Analysis, Block, Cfg, Edge, EdgeKind, EdgeOut, FunctionOut, Report};
pub use model::{load_payload, load_rom, read_u8, read_u16, Image, Segment, SegmentFlags};

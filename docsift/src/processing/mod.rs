pub mod extractors;
pub mod output;
mod processor;
pub mod rasterizer;
pub mod table;

pub use extractors::ExtractedContent;
pub use output::{output_path, preview, write_output};
pub use processor::DocumentProcessor;
pub use rasterizer::{PageRasterizer, PdftoppmRasterizer};

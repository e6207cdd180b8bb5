pub mod geometry;
pub mod header;
pub mod source;
pub mod tile;
pub mod tile_reader;

pub use geometry::{BitPix, ImageGeometry};
pub use header::{read_header, FitsHeader, HeaderValue};
pub use source::{ByteSource, FitsSource};
pub use tile::{default_tiles, Tile, TileRequest};
pub use tile_reader::read_tile;

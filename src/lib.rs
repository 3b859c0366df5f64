//! # vpath-rust
//!
//! A 2D vector-path geometry kernel. It builds paths of lines and curves,
//! combines them with boolean operations, triangulates them, strokes them
//! and paints them into premultiplied RGBA pixel buffers.
//!
//! ## Architecture
//!
//! Everything is built around [`path_storage::Path`]:
//!
//! 1. **Path model**: commands, points and conic weights, written by builder
//!    calls and read back unchanged
//! 2. **Boolean clipping**: a sweep-line engine that splits segments at their
//!    intersections and keeps the edges whose sides disagree under a winding
//!    rule (`clip`, `sweep`)
//! 3. **Triangulation**: a half-edge mesh arena, ear cutting and Delaunay
//!    edge flips (`mesh`)
//! 4. **Stroking**: offset rails with joins, caps, miter limits and dashes
//!    (`math_stroke`, `vcgen_dash`, `vcgen_stroke`)
//! 5. **Rasterization**: 24.8 fixed-point edges swept one pixel row at a time
//!    into a Porter-Duff compositor (`rasterizer_scanline`, `pixfmt_rgba`,
//!    `comp_op`, `renderer`)
//!
//! ```
//! use vpath_rust::color::Rgba8;
//! use vpath_rust::path_storage::Path;
//! use vpath_rust::renderer::Renderer;
//! use vpath_rust::rendering_buffer::RenderingBuffer;
//! use vpath_rust::style::FillStyle;
//!
//! let mut a = Path::new();
//! a.rect(0.0, 0.0, 10.0, 10.0);
//! let mut b = Path::new();
//! b.rect(5.0, 0.0, 10.0, 10.0);
//! let shape = vpath_rust::clip::union(&a, &b);
//!
//! let mut data = vec![0u8; 20 * 20 * 4];
//! let mut ren = Renderer::new(RenderingBuffer::new(&mut data, 20, 20));
//! assert_eq!(ren.fill_path(&shape, &FillStyle::new(Rgba8::BLACK)), 150);
//! ```

// Foundation types & math
pub mod array;
pub mod basics;
pub mod edge;
pub mod math;
pub mod point;

// Paths & curves
pub mod bounding_rect;
pub mod conv_curve;
pub mod curves;
pub mod path_storage;
pub mod pool;

// Boolean clipping & triangulation
pub mod clip;
pub mod mesh;
pub mod sweep;

// Stroking
pub mod math_stroke;
pub mod style;
pub mod vcgen_dash;
pub mod vcgen_stroke;

// Rasterizer & compositor
pub mod color;
pub mod comp_op;
pub mod pixfmt_rgba;
pub mod rasterizer_scanline;
pub mod rasterizer_sl_clip;
pub mod renderer;
pub mod rendering_buffer;

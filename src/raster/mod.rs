// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Block-raster codec.
//!
//! Each hex digit becomes a horizontal pair of solid square blocks, one per
//! base-4 sub-digit, colored from a four-entry palette. Pairs fill rows left
//! to right; unused area stays black.
//!
//! - [`symbol`]: palette, thresholds, block classifier.
//! - [`layout`]: raster geometry from digit count and reference width.
//! - [`encode`] / [`decode`]: digits to pixels and back.
//! - [`io`]: file persistence, JPEG helpers, resizing.

pub mod decode;
pub mod encode;
pub mod io;
pub mod layout;
pub mod symbol;

pub use decode::{count_mismatches, RasterScan};
pub use encode::EncodedRaster;
pub use io::{ImageFileIo, RasterIo};
pub use layout::Layout;
pub use symbol::Symbol;

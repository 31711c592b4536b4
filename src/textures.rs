//! Room face images.
//!
//! The room has four materials (side walls, ceiling, floor, back walls).
//! Each can come from an image file or a procedural fallback; all four are
//! resized to one square layer size and uploaded as a 2D texture array.
//!
//! ```ignore
//! let room = RoomTextures::from_dir("media");
//! Swarm::new().with_text("RUST").with_room_textures(room).run()?;
//! ```
//!
//! # Supported Formats
//!
//! - PNG
//! - JPEG

use std::path::Path;

use image::{imageops, RgbaImage};

use crate::error::TextureError;

/// Edge length of each texture array layer.
pub const LAYER_SIZE: u32 = 512;

/// One of the four room materials, in texture array layer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomFace {
    Side,
    Ceiling,
    Floor,
    Back,
}

impl RoomFace {
    pub const ALL: [RoomFace; 4] = [RoomFace::Side, RoomFace::Ceiling, RoomFace::Floor, RoomFace::Back];

    /// Texture array layer.
    pub fn layer(self) -> u32 {
        self as u32
    }

    /// Image file name looked up by [`RoomTextures::from_dir`].
    pub fn file_name(self) -> &'static str {
        match self {
            RoomFace::Side => "Side.png",
            RoomFace::Ceiling => "Ceiling.png",
            RoomFace::Floor => "Floor.png",
            RoomFace::Back => "Back.png",
        }
    }
}

/// RGBA8 pixels for one face.
#[derive(Debug, Clone)]
pub struct FaceImage {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl FaceImage {
    /// Wrap raw RGBA data, checking the length.
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Result<Self, TextureError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected || expected == 0 {
            return Err(TextureError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, height })
    }

    /// Load from a PNG or JPEG file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let bytes = std::fs::read(path.as_ref())?;
        let img = image::load_from_memory(&bytes)?.into_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            data: img.into_raw(),
            width,
            height,
        })
    }

    /// Create a solid color image (1x1 pixel).
    pub fn solid(r: u8, g: u8, b: u8) -> Self {
        Self {
            data: vec![r, g, b, 255],
            width: 1,
            height: 1,
        }
    }

    /// Create a checkerboard of `cells` x `cells` squares.
    pub fn checkerboard(size: u32, cells: u32, a: [u8; 3], b: [u8; 3]) -> Self {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let c = if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b };
                data.extend_from_slice(&[c[0], c[1], c[2], 255]);
            }
        }
        Self {
            data,
            width: size,
            height: size,
        }
    }

    /// Resample to a `size` x `size` square.
    pub fn resized(&self, size: u32) -> Vec<u8> {
        if self.width == size && self.height == size {
            return self.data.clone();
        }
        if self.width == 1 && self.height == 1 {
            return self.data.repeat((size * size) as usize);
        }
        match RgbaImage::from_raw(self.width, self.height, self.data.clone()) {
            Some(img) => imageops::resize(&img, size, size, imageops::FilterType::Triangle).into_raw(),
            // Constructors guarantee the length, but fields are public.
            None => vec![0; (size * size * 4) as usize],
        }
    }
}

/// The four room face images.
#[derive(Debug, Clone)]
pub struct RoomTextures {
    faces: [FaceImage; 4],
}

impl RoomTextures {
    /// Procedural stand-ins: plain walls, a dark ceiling and a tiled floor.
    pub fn procedural() -> Self {
        Self {
            faces: [
                FaceImage::solid(38, 40, 48),
                FaceImage::solid(18, 18, 22),
                FaceImage::checkerboard(LAYER_SIZE, 16, [92, 92, 98], [64, 64, 70]),
                FaceImage::solid(30, 32, 40),
            ],
        }
    }

    /// Load `Side.png`, `Ceiling.png`, `Floor.png` and `Back.png` from
    /// `dir`, keeping the procedural face for any that fail.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let mut textures = Self::procedural();
        for face in RoomFace::ALL {
            let path = dir.as_ref().join(face.file_name());
            match FaceImage::from_file(&path) {
                Ok(image) => textures = textures.with_face(face, image),
                Err(e) => log::warn!("using procedural {:?} texture: {}: {}", face, path.display(), e),
            }
        }
        textures
    }

    pub fn with_face(mut self, face: RoomFace, image: FaceImage) -> Self {
        self.faces[face.layer() as usize] = image;
        self
    }

    pub fn face(&self, face: RoomFace) -> &FaceImage {
        &self.faces[face.layer() as usize]
    }

    /// All layers, resized to `size`, concatenated in layer order.
    pub fn layer_bytes(&self, size: u32) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((size * size * 4) as usize * self.faces.len());
        for face in &self.faces {
            bytes.extend(face.resized(size));
        }
        bytes
    }
}

impl Default for RoomTextures {
    fn default() -> Self {
        Self::procedural()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(FaceImage::from_rgba(vec![0; 16], 2, 2).is_ok());
        match FaceImage::from_rgba(vec![0; 15], 2, 2) {
            Err(TextureError::SizeMismatch { expected, actual }) => {
                assert_eq!((expected, actual), (16, 15));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = FaceImage::from_file("/nonexistent/shapeswarm/Floor.png");
        assert!(matches!(result, Err(TextureError::Io(_))));
    }

    #[test]
    fn test_missing_dir_falls_back() {
        let textures = RoomTextures::from_dir("/nonexistent/shapeswarm");
        assert_eq!(textures.face(RoomFace::Side).width, 1);
        assert_eq!(textures.face(RoomFace::Floor).width, LAYER_SIZE);
    }

    #[test]
    fn test_layer_bytes_size() {
        let bytes = RoomTextures::procedural().layer_bytes(8);
        assert_eq!(bytes.len(), 8 * 8 * 4 * 4);
        // Solid faces stay solid after resampling.
        assert_eq!(&bytes[0..4], &[38, 40, 48, 255]);
    }

    #[test]
    fn test_checkerboard_alternates() {
        let board = FaceImage::checkerboard(4, 2, [255, 255, 255], [0, 0, 0]);
        assert_eq!(&board.data[0..3], &[255, 255, 255]);
        assert_eq!(&board.data[8..11], &[0, 0, 0]);
    }
}

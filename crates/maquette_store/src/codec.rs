//! # Record Codec
//!
//! Deterministic binary layout for persisted records.
//!
//! ## Format
//!
//! All integers and floats are little-endian. Floats round-trip
//! bit-exactly via their raw LE bytes.
//!
//! ```text
//! Vec3:           [4 bytes x f32][4 bytes y f32][4 bytes z f32]
//!
//! ModelRecord:    [4 bytes key length u32]
//!                 [N bytes key, UTF-8]
//!                 [12 bytes position]
//!                 [12 bytes euler rotation]
//!                 [12 bytes scale]
//!
//! SceneRecord:    [4 bytes model count u32]
//!                 [count x ModelRecord]
//!                 [12 bytes player position]
//!                 [12 bytes player euler rotation]
//!                 [12 bytes player scale]
//!
//! SettingsRecord: [1 byte main hand tag (1 = Primary, 2 = Secondary)]
//!                 [4 bytes user size f32]
//! ```
//!
//! No magic and no version tag: the persisted format is single-version.
//! Decoding is strict; truncated input, an unknown tag, invalid UTF-8 or
//! trailing bytes all fail.

use thiserror::Error;

use maquette_shared::{MainHand, ModelRecord, SceneRecord, SettingsRecord, Vec3};

/// Errors produced while decoding record bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input ended before the field being read.
    #[error("unexpected end of record bytes")]
    UnexpectedEnd,

    /// A string field held invalid UTF-8.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,

    /// A tag byte had no known meaning for its field.
    #[error("unknown tag {value} for {field}")]
    UnknownTag {
        /// The offending byte.
        value: u8,
        /// Which field carried it.
        field: &'static str,
    },

    /// Bytes remained after the record was fully read.
    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),
}

/// A record kind with a specified byte layout.
pub trait RecordCodec: Sized {
    /// Human-readable record kind for logs.
    const KIND: &'static str;

    /// Encodes the record into its durable byte form.
    fn encode(&self) -> Vec<u8>;

    /// Decodes a record from its durable byte form.
    ///
    /// The whole input must be consumed; trailing bytes are an error.
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError>;
}

/// Record writer - appends fields to a growable buffer.
#[derive(Default)]
struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn write_vec3(&mut self, value: Vec3) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
    }

    fn write_str(&mut self, value: &str) {
        self.write_u32(value.len() as u32);
        self.buf.extend_from_slice(value.as_bytes());
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Record reader - a cursor over record bytes.
struct RecordReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> RecordReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .position
            .checked_add(len)
            .ok_or(DecodeError::UnexpectedEnd)?;
        if end > self.bytes.len() {
            return Err(DecodeError::UnexpectedEnd);
        }
        let slice = &self.bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_f32(&mut self) -> Result<f32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_vec3(&mut self) -> Result<Vec3, DecodeError> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    fn read_str(&mut self) -> Result<String, DecodeError> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
    }

    /// Fails if any input remains unread.
    fn finish(self) -> Result<(), DecodeError> {
        let remaining = self.bytes.len() - self.position;
        if remaining != 0 {
            return Err(DecodeError::TrailingBytes(remaining));
        }
        Ok(())
    }
}

fn write_model(writer: &mut RecordWriter, model: &ModelRecord) {
    writer.write_str(&model.key);
    writer.write_vec3(model.position);
    writer.write_vec3(model.euler_rotation);
    writer.write_vec3(model.scale);
}

fn read_model(reader: &mut RecordReader<'_>) -> Result<ModelRecord, DecodeError> {
    Ok(ModelRecord {
        key: reader.read_str()?,
        position: reader.read_vec3()?,
        euler_rotation: reader.read_vec3()?,
        scale: reader.read_vec3()?,
    })
}

impl RecordCodec for SceneRecord {
    const KIND: &'static str = "scene";

    fn encode(&self) -> Vec<u8> {
        let mut writer = RecordWriter::default();
        writer.write_u32(self.models.len() as u32);
        for model in &self.models {
            write_model(&mut writer, model);
        }
        writer.write_vec3(self.player_position);
        writer.write_vec3(self.player_euler_rotation);
        writer.write_vec3(self.player_scale);
        writer.into_bytes()
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = RecordReader::new(bytes);
        let count = reader.read_u32()? as usize;
        let mut models = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            models.push(read_model(&mut reader)?);
        }
        let record = Self {
            models,
            player_position: reader.read_vec3()?,
            player_euler_rotation: reader.read_vec3()?,
            player_scale: reader.read_vec3()?,
        };
        reader.finish()?;
        Ok(record)
    }
}

impl RecordCodec for SettingsRecord {
    const KIND: &'static str = "settings";

    fn encode(&self) -> Vec<u8> {
        let mut writer = RecordWriter::default();
        writer.write_u8(self.main_hand as u8);
        writer.write_f32(self.user_size);
        writer.into_bytes()
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = RecordReader::new(bytes);
        let tag = reader.read_u8()?;
        let main_hand = MainHand::from_u8(tag).ok_or(DecodeError::UnknownTag {
            value: tag,
            field: "main_hand",
        })?;
        let user_size = reader.read_f32()?;
        reader.finish()?;
        Ok(Self {
            main_hand,
            user_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maquette_shared::Transform;

    fn sample_scene() -> SceneRecord {
        SceneRecord {
            models: vec![
                ModelRecord {
                    key: "abc".to_string(),
                    position: Vec3::new(1.0, -2.5, 3.75),
                    euler_rotation: Vec3::new(0.0, 90.0, 180.0),
                    scale: Vec3::new(0.5, 0.5, 0.5),
                },
                ModelRecord {
                    key: "abc".to_string(), // duplicate keys are allowed
                    position: Vec3::new(-7.0, 0.25, 12.0),
                    euler_rotation: Vec3::new(45.0, 0.0, 0.0),
                    scale: Vec3::new(2.0, 2.0, 2.0),
                },
            ],
            player_position: Vec3::new(0.0, 1.6, 0.0),
            player_euler_rotation: Vec3::new(0.0, 270.0, 0.0),
            player_scale: Vec3::ONE,
        }
    }

    #[test]
    fn test_scene_roundtrip() {
        let scene = sample_scene();
        let decoded = SceneRecord::decode(&scene.encode()).unwrap();
        assert_eq!(decoded, scene);
    }

    #[test]
    fn test_scene_roundtrip_preserves_order() {
        let scene = sample_scene();
        let decoded = SceneRecord::decode(&scene.encode()).unwrap();
        assert_eq!(decoded.models[0].position, scene.models[0].position);
        assert_eq!(decoded.models[1].position, scene.models[1].position);
    }

    #[test]
    fn test_float_bits_survive() {
        // Negative zero and subnormals must come back bit-identical.
        let mut scene = SceneRecord::empty();
        scene.player_position = Vec3::new(-0.0, f32::MIN_POSITIVE / 2.0, f32::MAX);
        let decoded = SceneRecord::decode(&scene.encode()).unwrap();
        assert_eq!(
            decoded.player_position.x.to_bits(),
            scene.player_position.x.to_bits()
        );
        assert_eq!(
            decoded.player_position.y.to_bits(),
            scene.player_position.y.to_bits()
        );
        assert_eq!(
            decoded.player_position.z.to_bits(),
            scene.player_position.z.to_bits()
        );
    }

    #[test]
    fn test_empty_scene_roundtrip() {
        let scene = SceneRecord::empty();
        let decoded = SceneRecord::decode(&scene.encode()).unwrap();
        assert_eq!(decoded, scene);
        assert!(decoded.models.is_empty());
    }

    #[test]
    fn test_empty_input_fails() {
        assert_eq!(SceneRecord::decode(&[]), Err(DecodeError::UnexpectedEnd));
        assert_eq!(SettingsRecord::decode(&[]), Err(DecodeError::UnexpectedEnd));
    }

    #[test]
    fn test_truncated_scene_fails() {
        let bytes = sample_scene().encode();
        for cut in [1, 5, bytes.len() / 2, bytes.len() - 1] {
            assert_eq!(
                SceneRecord::decode(&bytes[..cut]),
                Err(DecodeError::UnexpectedEnd),
                "cut at {cut} should fail"
            );
        }
    }

    #[test]
    fn test_trailing_bytes_fail() {
        let mut bytes = sample_scene().encode();
        bytes.push(0);
        assert_eq!(
            SceneRecord::decode(&bytes),
            Err(DecodeError::TrailingBytes(1))
        );
    }

    #[test]
    fn test_settings_roundtrip() {
        let settings = SettingsRecord::new(maquette_shared::MainHand::Secondary, 3.25);
        let decoded = SettingsRecord::decode(&settings.encode()).unwrap();
        assert_eq!(decoded, settings);
    }

    #[test]
    fn test_settings_bad_tag_fails() {
        let mut bytes = SettingsRecord::default().encode();
        bytes[0] = 9;
        assert_eq!(
            SettingsRecord::decode(&bytes),
            Err(DecodeError::UnknownTag {
                value: 9,
                field: "main_hand"
            })
        );
    }

    #[test]
    fn test_unicode_key_roundtrip() {
        let mut scene = SceneRecord::empty();
        scene.models.push(ModelRecord::from_transform(
            "maquette-élan-模型",
            &Transform::IDENTITY,
        ));
        let decoded = SceneRecord::decode(&scene.encode()).unwrap();
        assert_eq!(decoded.models[0].key, "maquette-élan-模型");
    }
}

//! VTK XML layer: document loading and `DataArray` decoding.
//!
//! Handles the three `DataArray` formats written by VTK's XML writers:
//! `ascii`, inline `binary` (base64) and `appended` (raw or base64, stored
//! after the `_` marker of the `AppendedData` element). Binary payloads carry
//! a header of `UInt32` or `UInt64` words and may be zlib-compressed in
//! blocks (`vtkZLibDataCompressor`).

use std::io::Read;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;
use roxmltree::{Document, Node};

use crate::util::{Error, Result};

const APPENDED_TAG: &[u8] = b"<AppendedData";
const APPENDED_END_TAG: &[u8] = b"</AppendedData>";
const ZLIB_COMPRESSOR: &str = "vtkZLibDataCompressor";

/// Byte order of binary payloads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Integer type of binary payload headers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeaderType {
    #[default]
    UInt32,
    UInt64,
}

impl HeaderType {
    /// Size of one header word in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::UInt32 => 4,
            Self::UInt64 => 8,
        }
    }
}

/// Attributes of the `VTKFile` root element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileInfo {
    /// Dataset type (`PolyData`, `vtkMultiBlockDataSet`, `Collection`, ...).
    pub kind: String,
    pub byte_order: Endianness,
    pub header_type: HeaderType,
    /// Binary payloads are zlib-compressed.
    pub compressed: bool,
}

impl FileInfo {
    fn from_root(root: Node<'_, '_>) -> Result<Self> {
        let byte_order = match root.attribute("byte_order") {
            None | Some("LittleEndian") => Endianness::Little,
            Some("BigEndian") => Endianness::Big,
            Some(other) => return Err(Error::Unsupported(format!("byte order {other}"))),
        };
        let header_type = match root.attribute("header_type") {
            None | Some("UInt32") => HeaderType::UInt32,
            Some("UInt64") => HeaderType::UInt64,
            Some(other) => return Err(Error::Unsupported(format!("header type {other}"))),
        };
        let compressed = match root.attribute("compressor") {
            None | Some("") => false,
            Some(ZLIB_COMPRESSOR) => true,
            Some(other) => return Err(Error::Unsupported(format!("compressor {other}"))),
        };

        Ok(Self {
            kind: root.attribute("type").unwrap_or_default().to_string(),
            byte_order,
            header_type,
            compressed,
        })
    }

    fn header_word(&self, bytes: &[u8], index: usize) -> Result<u64> {
        let size = self.header_type.size();
        let word = index
            .checked_mul(size)
            .and_then(|start| bytes.get(start..start.checked_add(size)?))
            .ok_or_else(|| Error::invalid("binary header truncated"))?;
        Ok(match (self.header_type, self.byte_order) {
            (HeaderType::UInt32, Endianness::Little) => LittleEndian::read_u32(word) as u64,
            (HeaderType::UInt32, Endianness::Big) => BigEndian::read_u32(word) as u64,
            (HeaderType::UInt64, Endianness::Little) => LittleEndian::read_u64(word),
            (HeaderType::UInt64, Endianness::Big) => BigEndian::read_u64(word),
        })
    }
}

/// Numeric element type of a `DataArray`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl ScalarType {
    /// Parse the `type` attribute of a `DataArray`.
    pub fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "Int8" | "Char" => Self::Int8,
            "UInt8" => Self::UInt8,
            "Int16" => Self::Int16,
            "UInt16" => Self::UInt16,
            "Int32" => Self::Int32,
            "UInt32" => Self::UInt32,
            "Int64" => Self::Int64,
            "UInt64" => Self::UInt64,
            "Float32" => Self::Float32,
            "Float64" => Self::Float64,
            other => return Err(Error::Unsupported(format!("data type {other}"))),
        })
    }

    /// Element size in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Floating-point element type.
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

/// Decoded array values, widened to 64 bits.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayValues {
    Int(Vec<i64>),
    Float(Vec<f64>),
}

impl ArrayValues {
    /// Number of scalar values.
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values as floating point.
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Self::Int(v) => v.iter().map(|&x| x as f64).collect(),
            Self::Float(v) => v.clone(),
        }
    }

    /// Values as integers; floating-point arrays are rejected.
    pub fn to_i64(&self) -> Result<Vec<i64>> {
        match self {
            Self::Int(v) => Ok(v.clone()),
            Self::Float(_) => Err(Error::invalid("expected an integer array")),
        }
    }
}

/// One decoded `DataArray` element.
#[derive(Clone, Debug, PartialEq)]
pub struct DataArray {
    pub name: String,
    pub components: usize,
    pub values: ArrayValues,
}

impl DataArray {
    /// Number of tuples (values / components).
    pub fn num_tuples(&self) -> usize {
        self.values.len() / self.components.max(1)
    }
}

/// A loaded VTK XML file, with any appended binary section split off.
pub struct VtkDocument {
    path: PathBuf,
    xml: String,
    appended: Option<Vec<u8>>,
}

impl VtkDocument {
    /// Load a VTK XML file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = read_file(path)?;
        Self::from_bytes(path, &bytes)
    }

    /// Build a document from file contents.
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self> {
        let (xml, appended) = split_appended(bytes)?;
        Ok(Self {
            path: path.to_path_buf(),
            xml,
            appended,
        })
    }

    /// Parse the XML part.
    pub fn parse(&self) -> Result<Document<'_>> {
        Ok(Document::parse(&self.xml)?)
    }

    /// Parse the `VTKFile` root element attributes.
    pub fn file_info(&self, doc: &Document<'_>) -> Result<FileInfo> {
        let root = doc.root_element();
        if !root.has_tag_name("VTKFile") {
            return Err(Error::missing_element(&self.path, "VTKFile"));
        }
        FileInfo::from_root(root)
    }

    /// Decode a `DataArray` element.
    pub fn read_data_array(&self, info: &FileInfo, node: Node<'_, '_>) -> Result<DataArray> {
        let name = node.attribute("Name").unwrap_or_default().to_string();
        let components = match node.attribute("NumberOfComponents") {
            Some(text) => text
                .trim()
                .parse::<usize>()
                .map_err(|_| Error::invalid(format!("'{name}': bad NumberOfComponents '{text}'")))?,
            None => 1,
        };
        let scalar = ScalarType::parse(
            node.attribute("type")
                .ok_or_else(|| Error::missing_attribute("DataArray", "type"))?,
        )?;

        let values = match node.attribute("format").unwrap_or("ascii") {
            "ascii" => parse_ascii(node.text().unwrap_or_default(), scalar)?,
            "binary" => {
                let bytes = unpack_base64(node.text().unwrap_or_default(), info)?;
                decode_values(&bytes, scalar, info.byte_order)?
            }
            "appended" => {
                let offset = node
                    .attribute("offset")
                    .ok_or_else(|| Error::missing_attribute("DataArray", "offset"))?;
                let offset = offset
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| Error::invalid(format!("'{name}': bad offset '{offset}'")))?;
                let bytes = self.read_appended(info, node, offset)?;
                decode_values(&bytes, scalar, info.byte_order)?
            }
            other => return Err(Error::Unsupported(format!("DataArray format {other}"))),
        };

        if values.len() % components.max(1) != 0 {
            return Err(Error::invalid(format!(
                "'{name}': {} values do not form {components}-component tuples",
                values.len()
            )));
        }

        Ok(DataArray {
            name,
            components,
            values,
        })
    }

    fn read_appended(&self, info: &FileInfo, node: Node<'_, '_>, offset: usize) -> Result<Vec<u8>> {
        let appended = self
            .appended
            .as_deref()
            .ok_or_else(|| Error::missing_element(&self.path, "AppendedData"))?;
        let section = appended
            .get(offset..)
            .ok_or_else(|| Error::invalid(format!("appended offset {offset} past end of data")))?;

        let encoding = node
            .document()
            .descendants()
            .find(|n| n.has_tag_name("AppendedData"))
            .and_then(|n| n.attribute("encoding"))
            .unwrap_or("raw");

        match encoding {
            "raw" => unpack_raw(section, info),
            "base64" => unpack_base64(std::str::from_utf8(section)?, info),
            other => Err(Error::Unsupported(format!("appended encoding {other}"))),
        }
    }
}

/// Read a file, reporting a missing file as [`Error::FileNotFound`].
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })
}

/// Split off the bytes following the `_` marker of `<AppendedData>`.
///
/// The XML part is closed right after the `AppendedData` start tag so the
/// element (and its `encoding` attribute) stays visible to the parser.
fn split_appended(bytes: &[u8]) -> Result<(String, Option<Vec<u8>>)> {
    let Some(start) = find(bytes, APPENDED_TAG, 0) else {
        return Ok((std::str::from_utf8(bytes)?.to_string(), None));
    };
    let tag_end = bytes[start..]
        .iter()
        .position(|&b| b == b'>')
        .map(|p| start + p)
        .ok_or_else(|| Error::invalid("unterminated <AppendedData> tag"))?;
    let marker = bytes[tag_end..]
        .iter()
        .position(|&b| b == b'_')
        .map(|p| tag_end + p)
        .ok_or_else(|| Error::invalid("appended data without '_' marker"))?;
    let data_end = rfind(bytes, APPENDED_END_TAG).filter(|&e| e > marker).unwrap_or(bytes.len());

    let mut xml = std::str::from_utf8(&bytes[..=tag_end])?.to_string();
    if bytes[tag_end - 1] == b'/' {
        xml.push_str("</VTKFile>");
    } else {
        xml.push_str("</AppendedData></VTKFile>");
    }
    Ok((xml, Some(bytes[marker + 1..data_end].to_vec())))
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

fn parse_ascii(text: &str, scalar: ScalarType) -> Result<ArrayValues> {
    let bad = |token: &str| Error::invalid(format!("bad ascii value '{token}'"));
    if scalar.is_float() {
        text.split_whitespace()
            .map(|t| t.parse::<f64>().map_err(|_| bad(t)))
            .collect::<Result<Vec<_>>>()
            .map(ArrayValues::Float)
    } else {
        text.split_whitespace()
            .map(|t| t.parse::<i64>().map_err(|_| bad(t)))
            .collect::<Result<Vec<_>>>()
            .map(ArrayValues::Int)
    }
}

fn decode_values(bytes: &[u8], scalar: ScalarType, order: Endianness) -> Result<ArrayValues> {
    if bytes.len() % scalar.size() != 0 {
        return Err(Error::invalid(format!(
            "{} bytes is not a whole number of {scalar:?} values",
            bytes.len()
        )));
    }
    Ok(match order {
        Endianness::Little => decode_with::<LittleEndian>(bytes, scalar),
        Endianness::Big => decode_with::<BigEndian>(bytes, scalar),
    })
}

fn decode_with<B: ByteOrder>(bytes: &[u8], scalar: ScalarType) -> ArrayValues {
    let words = bytes.chunks_exact(scalar.size());
    match scalar {
        ScalarType::Int8 => ArrayValues::Int(bytes.iter().map(|&b| b as i8 as i64).collect()),
        ScalarType::UInt8 => ArrayValues::Int(bytes.iter().map(|&b| b as i64).collect()),
        ScalarType::Int16 => ArrayValues::Int(words.map(|w| B::read_i16(w) as i64).collect()),
        ScalarType::UInt16 => ArrayValues::Int(words.map(|w| B::read_u16(w) as i64).collect()),
        ScalarType::Int32 => ArrayValues::Int(words.map(|w| B::read_i32(w) as i64).collect()),
        ScalarType::UInt32 => ArrayValues::Int(words.map(|w| B::read_u32(w) as i64).collect()),
        ScalarType::Int64 => ArrayValues::Int(words.map(B::read_i64).collect()),
        ScalarType::UInt64 => ArrayValues::Int(words.map(|w| B::read_u64(w) as i64).collect()),
        ScalarType::Float32 => ArrayValues::Float(words.map(|w| B::read_f32(w) as f64).collect()),
        ScalarType::Float64 => ArrayValues::Float(words.map(B::read_f64).collect()),
    }
}

/// Unpack a raw binary payload (header followed by data).
fn unpack_raw(bytes: &[u8], info: &FileInfo) -> Result<Vec<u8>> {
    let h = info.header_type.size();
    if !info.compressed {
        let size = info.header_word(bytes, 0)? as usize;
        return h
            .checked_add(size)
            .and_then(|end| bytes.get(h..end))
            .map(<[u8]>::to_vec)
            .ok_or_else(|| Error::invalid("binary payload shorter than its header"));
    }

    let num_blocks = info.header_word(bytes, 0)? as usize;
    let header_len = compressed_header_len(num_blocks, h)?;
    let header = bytes
        .get(..header_len)
        .ok_or_else(|| Error::invalid("compressed header truncated"))?;
    inflate_blocks(header, &bytes[header_len..], info)
}

/// Unpack a base64 payload.
///
/// VTK encodes the header and the data as separate base64 streams; older
/// writers use one stream for both when uncompressed. A padded header chunk
/// tells the two apart.
fn unpack_base64(text: &str, info: &FileInfo) -> Result<Vec<u8>> {
    let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let h = info.header_type.size();
    let chunk = |from: usize, len: usize| -> Result<Vec<u8>> {
        let to = from.saturating_add(len).min(text.len());
        let part = text
            .get(from.min(to)..to)
            .ok_or_else(|| Error::invalid("base64 payload truncated"))?;
        Ok(STANDARD.decode(part)?)
    };

    if !info.compressed {
        let header_chars = encoded_len(h)?;
        let header = chunk(0, header_chars)?;
        let size = info.header_word(&header, 0)? as usize;

        let separate = text.get(..header_chars).is_some_and(|s| s.ends_with('='));
        let data = if separate {
            chunk(header_chars, encoded_len(size)?)?
        } else {
            let total = h.checked_add(size).ok_or_else(oversized)?;
            chunk(0, encoded_len(total)?)?.get(h..).map(<[u8]>::to_vec).unwrap_or_default()
        };
        return data
            .get(..size)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| Error::invalid("base64 payload shorter than its header"));
    }

    let prefix = chunk(0, encoded_len(3 * h)?)?;
    let num_blocks = info.header_word(&prefix, 0)? as usize;
    let header_chars = encoded_len(compressed_header_len(num_blocks, h)?)?;
    let header = chunk(0, header_chars)?;

    let mut compressed_total = 0usize;
    for i in 0..num_blocks {
        let size = info.header_word(&header, 3 + i)? as usize;
        compressed_total = compressed_total.checked_add(size).ok_or_else(oversized)?;
    }
    let data = chunk(header_chars, encoded_len(compressed_total)?)?;
    inflate_blocks(&header, &data, info)
}

/// Inflate the zlib blocks described by a compressed header.
///
/// Header words: block count, uncompressed block size, size of the last
/// partial block (0 when full), then the compressed size of each block.
fn inflate_blocks(header: &[u8], data: &[u8], info: &FileInfo) -> Result<Vec<u8>> {
    let num_blocks = info.header_word(header, 0)? as usize;
    let block_size = info.header_word(header, 1)? as usize;
    let last_size = info.header_word(header, 2)? as usize;

    let capacity = num_blocks.saturating_mul(block_size).min(MAX_PREALLOCATION);
    let mut out = Vec::with_capacity(capacity);
    let mut pos = 0usize;
    for i in 0..num_blocks {
        let compressed = info.header_word(header, 3 + i)? as usize;
        let end = pos.checked_add(compressed).ok_or_else(oversized)?;
        let block = data
            .get(pos..end)
            .ok_or_else(|| Error::invalid(format!("compressed block {i} truncated")))?;
        pos = end;

        let expected = if i + 1 == num_blocks && last_size != 0 {
            last_size
        } else {
            block_size
        };
        let before = out.len();
        ZlibDecoder::new(block).read_to_end(&mut out)?;
        if out.len() - before != expected {
            return Err(Error::invalid(format!(
                "compressed block {i} inflated to {} bytes, expected {expected}",
                out.len() - before
            )));
        }
    }
    Ok(out)
}

/// Upper bound on the output buffer reserved from header sizes alone.
const MAX_PREALLOCATION: usize = 64 << 20;

fn oversized() -> Error {
    Error::invalid("binary header sizes overflow")
}

/// Length of a compressed header: three fixed words plus one per block.
fn compressed_header_len(num_blocks: usize, word: usize) -> Result<usize> {
    num_blocks
        .checked_add(3)
        .and_then(|words| words.checked_mul(word))
        .ok_or_else(oversized)
}

/// Base64 characters needed for `bytes` bytes.
fn encoded_len(bytes: usize) -> Result<usize> {
    bytes.div_ceil(3).checked_mul(4).ok_or_else(oversized)
}

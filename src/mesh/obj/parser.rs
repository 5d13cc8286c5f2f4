use std::num;
use std::path::Path;
use std::{fs, io};

use log::{debug, info, warn};

use super::builder::{ObjCorner, ObjFace, ObjMeshBuilder};
use super::meta::ObjMeta;

#[derive(thiserror::Error, Debug)]
pub(crate) enum ParserError {
    #[error("Failed to read model.")]
    Io(#[from] io::Error),
    #[error("Line {line}: failed to parse number.")]
    ParseFloat {
        line: usize,
        source: num::ParseFloatError,
    },
    #[error("Line {line}: failed to parse face index.")]
    ParseInt {
        line: usize,
        source: num::ParseIntError,
    },
    #[error("Line {line}: expected {expected} numbers, found {found}.")]
    TooFewNumbers {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: corner {token:?} must reference position, uv and normal.")]
    ParseCorner { line: usize, token: String },
    #[error("Line {line}: face needs at least 3 corners.")]
    FaceTooShort { line: usize },
}

// parses wavefront obj (https://en.wikipedia.org/wiki/Wavefront_.obj_file),
// restricted to the subset needed for static render meshes: v/vt/vn plus
// faces with full position/uv/normal corners
pub(crate) fn parse(filepath: &Path, meta: ObjMeta) -> Result<ObjMeshBuilder, ParserError> {
    info!("Loading mesh: {}", filepath.display());
    let content = fs::read_to_string(filepath)?;
    parse_str(&content, meta)
}

// all parsing state lives in the builder threaded through each call, so
// independent files can be parsed concurrently
pub(crate) fn parse_str(content: &str, meta: ObjMeta) -> Result<ObjMeshBuilder, ParserError> {
    let mut builder = ObjMeshBuilder::new(meta);

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;

        // a comment may trail a directive; everything from `#` on is dropped
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };

        let (token, value) = match line.trim().split_once(char::is_whitespace) {
            Some((token, value)) => (token, value.trim_start()),
            None => (line.trim(), ""),
        };

        if token.is_empty() {
            continue;
        }

        debug!("Parsing line {}: \"{}\"", line_no, line);
        parse_token(line_no, token, value, &mut builder)?;
    }

    Ok(builder)
}

fn parse_token(
    line: usize,
    token: &str,
    value: &str,
    builder: &mut ObjMeshBuilder,
) -> Result<(), ParserError> {
    // most exporters write directives in lower case, but matching is
    // case-insensitive
    match token.to_ascii_lowercase().as_str() {
        // name
        "o" => builder.set_name(value),
        // vertex position
        "v" => builder.push_position(parse_vec3(line, value)?),
        // texture coordinates
        "vt" => builder.push_uv(parse_vec2(line, value)?),
        // vertex normals
        "vn" => builder.push_normal(parse_vec3(line, value)?),
        // polygonal face
        "f" => builder.push_face(parse_face(line, value)?),
        // materials
        "mtllib" | "usemtl" => warn!("Materials are not supported. Ignoring."),
        // group (submesh)
        "g" => warn!("Groups are not supported; all faces go into one mesh."),
        // smoothing groups
        "s" => warn!("Smoothing groups are not supported. Ignoring."),
        // parameter space vertices
        "vp" => warn!("Parameter space vertices are not supported. Ignoring."),
        // unknown directives are skipped so files from newer exporters still load
        other => debug!("Line {}: ignored directive {:?}", line, other),
    }

    Ok(())
}

fn parse_vec3(line: usize, value: &str) -> Result<[f32; 3], ParserError> {
    let numbers = parse_floats(line, value, 3)?;
    Ok([numbers[0], numbers[1], numbers[2]])
}

fn parse_vec2(line: usize, value: &str) -> Result<[f32; 2], ParserError> {
    let numbers = parse_floats(line, value, 2)?;
    Ok([numbers[0], numbers[1]])
}

// parses exactly `expected` whitespace separated floats; missing or
// malformed fields are hard errors, anything beyond them (e.g. vertex
// colors on `v` lines) is outside the subset and skipped
fn parse_floats(line: usize, value: &str, expected: usize) -> Result<Vec<f32>, ParserError> {
    let mut numbers = Vec::with_capacity(expected);
    let mut fields = value.split_whitespace();

    for _ in 0..expected {
        let field = fields.next().ok_or_else(|| ParserError::TooFewNumbers {
            line,
            expected,
            found: numbers.len(),
        })?;
        let number = field
            .parse()
            .map_err(|source| ParserError::ParseFloat { line, source })?;
        numbers.push(number);
    }

    if fields.next().is_some() {
        debug!("Line {}: ignoring extra fields in \"{}\"", line, value);
    }

    Ok(numbers)
}

// parses corners separated by spaces, which are themselves triplets
// separated by slashes
fn parse_face(line: usize, value: &str) -> Result<ObjFace, ParserError> {
    let corners = value
        .split_whitespace()
        .map(|token| parse_corner(line, token))
        .collect::<Result<Vec<_>, _>>()?;

    if corners.len() < 3 {
        return Err(ParserError::FaceTooShort { line });
    }

    Ok(ObjFace { corners })
}

// a corner is `position/uv/normal`, all three 1-based and mandatory in this
// subset; they are converted to 0-based on the spot
fn parse_corner(line: usize, token: &str) -> Result<ObjCorner, ParserError> {
    let mut indices = [0usize; 3];
    let mut parts = token.split('/');

    for slot in indices.iter_mut() {
        let part = parts
            .next()
            .filter(|part| !part.is_empty())
            .ok_or_else(|| ParserError::ParseCorner {
                line,
                token: token.into(),
            })?;
        let index: usize = part
            .parse()
            .map_err(|source| ParserError::ParseInt { line, source })?;
        if index == 0 {
            return Err(ParserError::ParseCorner {
                line,
                token: token.into(),
            });
        }
        *slot = index - 1;
    }

    if parts.next().is_some() {
        return Err(ParserError::ParseCorner {
            line,
            token: token.into(),
        });
    }

    Ok(ObjCorner {
        pos_i: indices[0],
        uv_i: indices[1],
        normal_i: indices[2],
    })
}

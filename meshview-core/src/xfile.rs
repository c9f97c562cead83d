/// DirectX `.x` mesh parser (text format)
///
/// Lexing is done with nom; the token stream is then walked into a tree of
/// data objects. Every `Mesh` in the file (including those nested in `Frame`
/// hierarchies) is merged into one [`Mesh`] whose subsets follow the
/// `MeshMaterialList`. Material properties themselves are not extracted.
use nalgebra::{Matrix4, Point3};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::{
        alpha1, alphanumeric1, anychar, char, digit0, digit1, multispace1, not_line_ending, one_of,
    },
    combinator::{map, map_res, opt, recognize, value},
    multi::many0_count,
    sequence::{delimited, pair, tuple},
    IResult,
};

use crate::error::XFileError;
use crate::geometry::{Mesh, Triangle};

const HEADER_LEN: usize = 16;
/// Deepest object nesting accepted.
const MAX_DEPTH: usize = 64;
const MAX_MATERIALS: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Ident(&'a str),
    Number(f64),
    Str(&'a str),
    Guid(&'a str),
    Open,
    Close,
    Semi,
    Comma,
    Symbol(char),
}

fn trivia(input: &str) -> IResult<&str, usize> {
    many0_count(alt((
        value((), multispace1),
        value((), pair(alt((tag("//"), tag("#"))), not_line_ending)),
    )))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_"), tag("-")))),
    ))(input)
}

fn number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        str::parse::<f64>,
    )(input)
}

fn token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        map(identifier, Token::Ident),
        map(number, Token::Number),
        map(delimited(char('"'), take_until("\""), char('"')), Token::Str),
        map(delimited(char('<'), take_until(">"), char('>')), |g: &str| {
            Token::Guid(g.trim())
        }),
        value(Token::Open, char('{')),
        value(Token::Close, char('}')),
        value(Token::Semi, char(';')),
        value(Token::Comma, char(',')),
        map(anychar, Token::Symbol),
    ))(input)
}

fn tokenize(source: &str) -> Result<Vec<Token<'_>>, XFileError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    loop {
        let offset = source.len() - rest.len();
        let (after_trivia, _) = trivia(rest).map_err(|_| XFileError::Lex { offset })?;
        if after_trivia.is_empty() {
            return Ok(tokens);
        }
        let offset = source.len() - after_trivia.len();
        let (after_token, tok) = token(after_trivia).map_err(|_| XFileError::Lex { offset })?;
        tokens.push(tok);
        rest = after_token;
    }
}

/// One `Kind [name] { ... }` block. Only numeric members are kept.
#[derive(Debug, Default)]
struct DataObject<'a> {
    kind: &'a str,
    name: Option<&'a str>,
    numbers: Vec<f64>,
    children: Vec<DataObject<'a>>,
}

impl<'a> DataObject<'a> {
    fn child(&self, kind: &str) -> Option<&DataObject<'a>> {
        self.children.iter().find(|c| c.kind == kind)
    }

    fn label(&self) -> String {
        self.name.unwrap_or(self.kind).to_string()
    }
}

struct TreeParser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl<'t, 'a> TreeParser<'t, 'a> {
    fn new(tokens: &'t [Token<'a>]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek_at(&self, ahead: usize) -> Option<Token<'a>> {
        self.tokens.get(self.pos + ahead).copied()
    }

    fn next(&mut self) -> Option<Token<'a>> {
        let tok = self.peek_at(0);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_open(&mut self, context: &str) -> Result<(), XFileError> {
        match self.next() {
            Some(Token::Open) => Ok(()),
            other => Err(XFileError::Syntax(format!(
                "expected `{{` after {context}, found {other:?}"
            ))),
        }
    }

    fn parse_file(&mut self) -> Result<Vec<DataObject<'a>>, XFileError> {
        let mut objects = Vec::new();
        while let Some(tok) = self.peek_at(0) {
            match tok {
                Token::Ident("template") => self.skip_template()?,
                Token::Ident(_) => objects.push(self.parse_object(0)?),
                Token::Semi | Token::Comma => self.pos += 1,
                other => {
                    return Err(XFileError::Syntax(format!(
                        "unexpected {other:?} at top level"
                    )))
                }
            }
        }
        Ok(objects)
    }

    fn skip_template(&mut self) -> Result<(), XFileError> {
        self.pos += 1;
        if let Some(Token::Ident(_)) = self.peek_at(0) {
            self.pos += 1;
        }
        self.expect_open("template")?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.next() {
                Some(Token::Open) => depth += 1,
                Some(Token::Close) => depth -= 1,
                Some(_) => {}
                None => return Err(XFileError::Syntax("unterminated template".into())),
            }
        }
        Ok(())
    }

    fn parse_object(&mut self, depth: usize) -> Result<DataObject<'a>, XFileError> {
        if depth >= MAX_DEPTH {
            return Err(XFileError::Syntax(format!(
                "objects nested deeper than {MAX_DEPTH} levels"
            )));
        }
        let kind = match self.next() {
            Some(Token::Ident(kind)) => kind,
            other => {
                return Err(XFileError::Syntax(format!(
                    "expected object type, found {other:?}"
                )))
            }
        };
        let mut object = DataObject {
            kind,
            ..DataObject::default()
        };
        if let Some(Token::Ident(name)) = self.peek_at(0) {
            object.name = Some(name);
            self.pos += 1;
        }
        self.expect_open(kind)?;
        if let Some(Token::Guid(_)) = self.peek_at(0) {
            self.pos += 1;
        }

        loop {
            match self.next() {
                None => {
                    return Err(XFileError::Syntax(format!("unterminated `{kind}` object")))
                }
                Some(Token::Close) => return Ok(object),
                Some(Token::Number(n)) => object.numbers.push(n),
                Some(Token::Ident(_)) => {
                    let starts_object = matches!(
                        (self.peek_at(0), self.peek_at(1)),
                        (Some(Token::Open), _) | (Some(Token::Ident(_)), Some(Token::Open))
                    );
                    if starts_object {
                        self.pos -= 1;
                        object.children.push(self.parse_object(depth + 1)?);
                    }
                }
                Some(Token::Open) => self.skip_reference()?,
                Some(_) => {}
            }
        }
    }

    /// `{ Name }` or `{ <guid> }` references to objects declared elsewhere.
    fn skip_reference(&mut self) -> Result<(), XFileError> {
        loop {
            match self.next() {
                Some(Token::Close) => return Ok(()),
                Some(Token::Ident(_)) | Some(Token::Guid(_)) => {}
                other => {
                    return Err(XFileError::Syntax(format!(
                        "unexpected {other:?} inside reference"
                    )))
                }
            }
        }
    }
}

/// Sequential reader over an object's numeric members.
struct Values<'o> {
    numbers: &'o [f64],
    pos: usize,
    mesh: String,
}

impl<'o> Values<'o> {
    fn malformed(&self, reason: impl Into<String>) -> XFileError {
        XFileError::MalformedMesh {
            mesh: self.mesh.clone(),
            reason: reason.into(),
        }
    }

    fn float(&mut self, what: &str) -> Result<f32, XFileError> {
        let n = self
            .numbers
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.malformed(format!("missing {what}")))?;
        self.pos += 1;
        Ok(n as f32)
    }

    fn count(&mut self, what: &str) -> Result<usize, XFileError> {
        let n = self.float(what)?;
        if n < 0.0 || n.fract() != 0.0 {
            return Err(self.malformed(format!("{what} is not a count: {n}")));
        }
        Ok(n as usize)
    }

    /// A count of items that each take at least `width` more numbers.
    fn items(&mut self, what: &str, width: usize) -> Result<usize, XFileError> {
        let n = self.count(what)?;
        let remaining = self.numbers.len() - self.pos;
        if n > remaining / width {
            return Err(self.malformed(format!(
                "{what} {n} exceeds the {remaining} values that follow"
            )));
        }
        Ok(n)
    }
}

/// Triangles of one `Mesh` object tagged with their local material index.
struct MeshPart {
    triangles: Vec<(usize, Triangle)>,
    materials: usize,
}

fn decode_mesh(object: &DataObject<'_>, transform: &Matrix4<f32>) -> Result<MeshPart, XFileError> {
    let mut values = Values {
        numbers: &object.numbers,
        pos: 0,
        mesh: object.label(),
    };

    let vertex_count = values.items("vertex count", 3)?;
    let mut positions = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        let x = values.float("vertex x")?;
        let y = values.float("vertex y")?;
        let z = values.float("vertex z")?;
        positions.push(transform.transform_point(&Point3::new(x, y, z)));
    }

    // Size plus at least three indices per face.
    let face_count = values.items("face count", 4)?;
    let mut faces = Vec::with_capacity(face_count);
    for face in 0..face_count {
        let corners = values.items("face size", 1)?;
        if corners < 3 {
            return Err(values.malformed(format!("face {face} has {corners} corners")));
        }
        let mut indices = Vec::with_capacity(corners);
        for _ in 0..corners {
            let index = values.count("face index")?;
            if index >= vertex_count {
                return Err(values.malformed(format!(
                    "face {face} references vertex {index} of {vertex_count}"
                )));
            }
            indices.push(index);
        }
        faces.push(indices);
    }

    let (materials, face_materials) = match object.child("MeshMaterialList") {
        Some(list) => decode_material_list(list, &values.mesh, face_count)?,
        None => (1, vec![0; face_count]),
    };

    let mut triangles = Vec::new();
    for (indices, &material) in faces.iter().zip(&face_materials) {
        for edge in indices[1..].windows(2) {
            triangles.push((
                material,
                Triangle::from_positions(
                    positions[indices[0]],
                    positions[edge[0]],
                    positions[edge[1]],
                ),
            ));
        }
    }

    Ok(MeshPart {
        triangles,
        materials,
    })
}

fn decode_material_list(
    list: &DataObject<'_>,
    mesh: &str,
    face_count: usize,
) -> Result<(usize, Vec<usize>), XFileError> {
    let mut values = Values {
        numbers: &list.numbers,
        pos: 0,
        mesh: mesh.to_string(),
    };
    let materials = values.count("material count")?;
    if materials > MAX_MATERIALS {
        return Err(values.malformed(format!("{materials} materials")));
    }
    let listed = values.items("face material count", 1)?;
    let mut face_materials = Vec::with_capacity(face_count);
    for _ in 0..listed {
        let material = values.count("face material")?;
        if material >= materials {
            return Err(values.malformed(format!(
                "material index {material} out of {materials}"
            )));
        }
        face_materials.push(material);
    }

    // Short lists repeat their last entry over the remaining faces.
    match face_materials.last().copied() {
        Some(last) => face_materials.resize(face_count, last),
        None if face_count > 0 => return Err(values.malformed("empty face material list")),
        None => {}
    }
    Ok((materials.max(1), face_materials))
}

fn frame_matrix(frame: &DataObject<'_>) -> Result<Matrix4<f32>, XFileError> {
    let Some(matrix) = frame.child("FrameTransformMatrix") else {
        return Ok(Matrix4::identity());
    };
    if matrix.numbers.len() < 16 {
        return Err(XFileError::Syntax(format!(
            "FrameTransformMatrix of `{}` has {} values",
            frame.label(),
            matrix.numbers.len()
        )));
    }
    let values: Vec<f32> = matrix.numbers[..16].iter().map(|&n| n as f32).collect();
    // Stored row-major for row vectors.
    Ok(Matrix4::from_row_slice(&values).transpose())
}

fn collect_meshes<'o, 'a>(
    objects: &'o [DataObject<'a>],
    parent: &Matrix4<f32>,
    out: &mut Vec<(Matrix4<f32>, &'o DataObject<'a>)>,
) -> Result<(), XFileError> {
    for object in objects {
        match object.kind {
            "Mesh" => out.push((*parent, object)),
            "Frame" => {
                let world = parent * frame_matrix(object)?;
                collect_meshes(&object.children, &world, out)?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Parse a text `.x` file into a single mesh with one subset per material.
pub fn parse_x(name: &str, data: &[u8]) -> Result<Mesh, XFileError> {
    if data.len() < HEADER_LEN || &data[..4] != b"xof " {
        return Err(XFileError::BadHeader);
    }
    let format = &data[8..12];
    if format != b"txt " {
        return Err(XFileError::UnsupportedFormat(
            String::from_utf8_lossy(format).trim().to_string(),
        ));
    }

    let body = String::from_utf8_lossy(&data[HEADER_LEN..]);
    let tokens = tokenize(&body)?;
    let objects = TreeParser::new(&tokens).parse_file()?;

    let mut meshes = Vec::new();
    collect_meshes(&objects, &Matrix4::identity(), &mut meshes)?;
    if meshes.is_empty() {
        return Err(XFileError::NoMesh);
    }

    let mut groups: Vec<Vec<Triangle>> = Vec::new();
    for (transform, object) in meshes {
        let part = decode_mesh(object, &transform)?;
        let base = groups.len();
        groups.resize_with(base + part.materials, Vec::new);
        for (material, triangle) in part.triangles {
            groups[base + material].push(triangle);
        }
    }

    Ok(Mesh::from_subsets(name, groups))
}

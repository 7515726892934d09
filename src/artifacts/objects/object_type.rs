use crate::error::TwigError;
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    /// Parse the `<type> <len>\0` header, leaving the reader positioned at
    /// the start of the object body.
    ///
    /// Returns the object type and the declared body length.
    pub fn parse_header(reader: &mut impl BufRead) -> anyhow::Result<(ObjectType, usize)> {
        let mut header = Vec::new();
        reader.read_until(b'\0', &mut header)?;

        if header.last() != Some(&b'\0') {
            return Err(TwigError::CorruptObject("missing header separator".into()).into());
        }
        header.pop();

        let header = String::from_utf8(header)
            .map_err(|_| TwigError::CorruptObject("header is not valid utf-8".into()))?;
        let (object_type, size) = header
            .split_once(' ')
            .ok_or_else(|| TwigError::CorruptObject(format!("malformed header {header:?}")))?;

        let object_type = ObjectType::try_from(object_type)?;
        let size = size
            .parse::<usize>()
            .map_err(|_| TwigError::CorruptObject(format!("invalid declared length {size:?}")))?;

        Ok((object_type, size))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            other => Err(TwigError::CorruptObject(format!("unknown object type {other:?}")).into()),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_type_and_declared_length() {
        let mut reader = Cursor::new(b"blob 11\0hello world".to_vec());
        let (object_type, size) = ObjectType::parse_header(&mut reader).unwrap();
        assert_eq!(object_type, ObjectType::Blob);
        assert_eq!(size, 11);
    }

    #[test]
    fn missing_separator_is_corrupt() {
        let mut reader = Cursor::new(b"blob 11 hello".to_vec());
        let err = ObjectType::parse_header(&mut reader).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TwigError>(),
            Some(TwigError::CorruptObject(_))
        ));
    }

    #[test]
    fn unknown_type_tag_is_corrupt() {
        let mut reader = Cursor::new(b"gadget 4\0abcd".to_vec());
        let err = ObjectType::parse_header(&mut reader).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TwigError>(),
            Some(TwigError::CorruptObject(_))
        ));
    }
}

//! Commit object: a snapshot pointer with authorship and parent linkage.
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>          (absent for root commits, twice for merges)
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```
//!
//! Header keys we do not understand are preserved opaquely and re-emitted on
//! serialization, so foreign commits survive a read/write cycle unchanged.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::io::{BufRead, Write};

/// Pattern for `name <email> unixTime timezone` author/committer values.
const AUTHOR_REGEX: &str = r"^(.*) <(.*)> (\d+) ([+-]\d{4})$";

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Author stamped with the current local time.
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// `Name <email@example.com>`
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Name <email> unixTime timezone` as written into commit objects.
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// `Mon Jan 1 12:34:56 2024 +0000`
    pub fn readable_timestamp(&self) -> String {
        self.timestamp.format("%a %b %-d %H:%M:%S %Y %z").to_string()
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let captures = regex::Regex::new(AUTHOR_REGEX)?
            .captures(value)
            .with_context(|| format!("malformed author value {value:?}"))?;

        let name = captures[1].to_string();
        let email = captures[2].to_string();
        let seconds = captures[3].parse::<i64>().context("invalid timestamp")?;

        // offsets are written as +HHMM / -HHMM
        let offset_raw = &captures[4];
        let sign = if offset_raw.starts_with('-') { -1 } else { 1 };
        let hours = offset_raw[1..3].parse::<i32>().context("invalid timezone offset")?;
        let minutes = offset_raw[3..5].parse::<i32>().context("invalid timezone offset")?;
        let offset = chrono::FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .context("timezone offset out of range")?;

        let timestamp = chrono::DateTime::from_timestamp(seconds, 0)
            .context("timestamp out of range")?
            .with_timezone(&offset);

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit ids: empty for root commits, two for merge commits.
    parents: Vec<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    /// Unrecognized header lines, kept verbatim.
    extra_headers: Vec<(String, String)>,
    message: String,
}

impl Commit {
    pub fn new(parents: Vec<ObjectId>, tree_oid: ObjectId, author: Author, message: String) -> Self {
        Commit {
            parents,
            tree_oid,
            author: author.clone(),
            committer: author,
            extra_headers: Vec::new(),
            message,
        }
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    /// First parent; the one followed by the linear history walk.
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    /// Second parent, present on merge commits only.
    pub fn second_parent(&self) -> Option<&ObjectId> {
        self.parents.get(1)
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// First message line, for one-line displays.
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut lines = vec![format!("tree {}", self.tree_oid)];
        for parent in &self.parents {
            lines.push(format!("parent {parent}"));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        for (key, value) in &self.extra_headers {
            lines.push(format!("{key} {value}"));
        }
        lines.push(String::new());
        lines.push(self.message.clone());

        let body = lines.join("\n");

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), body.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(body.as_bytes())?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader.bytes().collect::<Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)?;

        let mut tree_oid = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;
        let mut extra_headers = Vec::new();

        let mut lines = content.lines();
        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }

            let (key, value) = line
                .split_once(' ')
                .with_context(|| format!("malformed commit header line {line:?}"))?;
            match key {
                "tree" => tree_oid = Some(ObjectId::try_parse(value)?),
                "parent" => parents.push(ObjectId::try_parse(value)?),
                "author" => author = Some(Author::try_from(value)?),
                "committer" => committer = Some(Author::try_from(value)?),
                _ => extra_headers.push((key.to_string(), value.to_string())),
            }
        }

        let message = lines.collect::<Vec<&str>>().join("\n");
        let author = author.context("commit object is missing its author line")?;

        Ok(Commit {
            parents,
            tree_oid: tree_oid.context("commit object is missing its tree line")?,
            committer: committer.unwrap_or_else(|| author.clone()),
            author,
            extra_headers,
            message,
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn oid(fill: char) -> ObjectId {
        ObjectId::try_parse(fill.to_string().repeat(40)).unwrap()
    }

    fn fixed_author() -> Author {
        Author::new_with_timestamp(
            "Ada Lovelace".to_string(),
            "ada@example.com".to_string(),
            chrono::DateTime::parse_from_rfc3339("2024-03-01T10:30:00+02:00").unwrap(),
        )
    }

    fn reparse(commit: &Commit) -> Commit {
        let bytes = commit.serialize().unwrap();
        let mut reader = Cursor::new(bytes);
        ObjectType::parse_header(&mut reader).unwrap();
        Commit::deserialize(reader).unwrap()
    }

    #[test]
    fn round_trips_a_root_commit() {
        let commit = Commit::new(vec![], oid('a'), fixed_author(), "initial".to_string());
        assert_eq!(reparse(&commit), commit);
    }

    #[test]
    fn round_trips_a_merge_commit_with_two_parents() {
        let commit = Commit::new(
            vec![oid('b'), oid('c')],
            oid('a'),
            fixed_author(),
            "Merge branch 'topic'".to_string(),
        );
        let parsed = reparse(&commit);

        assert_eq!(parsed.parent(), Some(&oid('b')));
        assert_eq!(parsed.second_parent(), Some(&oid('c')));
        assert_eq!(parsed, commit);
    }

    #[test]
    fn preserves_unknown_header_keys() {
        let mut commit = Commit::new(vec![], oid('a'), fixed_author(), "msg".to_string());
        commit
            .extra_headers
            .push(("encoding".to_string(), "ISO-8859-1".to_string()));

        let parsed = reparse(&commit);
        assert_eq!(
            parsed.extra_headers,
            vec![("encoding".to_string(), "ISO-8859-1".to_string())]
        );
        assert_eq!(parsed.object_id().unwrap(), commit.object_id().unwrap());
    }

    #[test]
    fn author_line_parses_name_email_time_and_zone() {
        let author = Author::try_from("Ada Lovelace <ada@example.com> 1709281800 +0200").unwrap();
        assert_eq!(author.display_name(), "Ada Lovelace <ada@example.com>");
        assert_eq!(
            author.display(),
            "Ada Lovelace <ada@example.com> 1709281800 +0200"
        );
    }

    #[test]
    fn multiline_messages_survive() {
        let commit = Commit::new(
            vec![oid('b')],
            oid('a'),
            fixed_author(),
            "subject\n\nbody paragraph\nsecond line".to_string(),
        );
        let parsed = reparse(&commit);
        assert_eq!(parsed.message(), commit.message());
        assert_eq!(parsed.short_message(), "subject");
    }
}

//! Legacy comma-separated record format.
//!
//! One user per line:
//!
//! ```text
//! name,id,accessLevel,group,student
//! name,id,accessLevel,department,teacher
//! name,id,accessLevel,admin
//! ```
//!
//! Fields are not escaped. A name containing a comma produces a record with
//! too many fields, which the decoder rejects instead of guessing.

use crate::error::{LineError, WardenError, WardenResult};
use crate::types::{Role, User};
use std::fmt::Write as _;

const TAG_STUDENT: &str = "student";
const TAG_TEACHER: &str = "teacher";
const TAG_ADMIN: &str = "admin";

/// Encode one user as a single line, without the trailing newline.
pub fn encode_user(user: &User) -> String {
    let mut line = format!("{},{},{}", user.name(), user.id(), user.access_level());
    if let Some(extra) = user.role().extra_field() {
        line.push(',');
        line.push_str(extra);
    }
    line.push(',');
    line.push_str(user.role().tag());
    line
}

/// Encode all users, one newline-terminated line each.
pub fn encode(users: &[User]) -> String {
    let mut out = String::with_capacity(users.len() * 48);
    for user in users {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{}", encode_user(user));
    }
    out
}

/// Reject users whose fields would split into extra fields or lines.
///
/// [`encode`] never escapes, so this is the only guard against writing a
/// file the decoder will refuse.
pub fn check_encodable(user: &User) -> WardenResult<()> {
    let extra = match user.role() {
        Role::Student { group } => Some(("group", group.as_str())),
        Role::Teacher { department } => Some(("department", department.as_str())),
        Role::Administrator => None,
    };
    for (field, value) in std::iter::once(("name", user.name())).chain(extra) {
        if value.contains([',', '\n', '\r']) {
            return Err(WardenError::Unencodable {
                field,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

/// Decode a single record. `line_no` is only used for error reporting.
pub fn decode_line(line: &str, line_no: usize) -> Result<User, LineError> {
    let err = |reason: String| LineError {
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split(',').collect();
    // `split` always yields at least one item.
    let tag = fields[fields.len() - 1];

    let expected = match tag {
        TAG_STUDENT | TAG_TEACHER => 5,
        TAG_ADMIN => 4,
        other => return Err(err(format!("unknown type tag `{other}`"))),
    };
    if fields.len() != expected {
        return Err(err(format!(
            "expected {expected} fields for a `{tag}` record, found {}",
            fields.len()
        )));
    }

    let name = fields[0];
    let id: i64 = fields[1]
        .parse()
        .map_err(|_| err(format!("invalid id `{}`", fields[1])))?;
    let access_level: i64 = fields[2]
        .parse()
        .map_err(|_| err(format!("invalid access level `{}`", fields[2])))?;

    let role = match tag {
        TAG_STUDENT => Role::Student {
            group: fields[3].to_string(),
        },
        TAG_TEACHER => Role::Teacher {
            department: fields[3].to_string(),
        },
        _ => Role::Administrator,
    };

    User::new(name, id, access_level, role).map_err(|e| err(e.to_string()))
}

/// Decode every non-blank line, yielding one result per record.
///
/// Line numbers are 1-based and count blank lines, so they match the file.
pub fn decode_lines(text: &str) -> impl Iterator<Item = Result<User, LineError>> + '_ {
    text.lines().enumerate().filter_map(|(idx, raw)| {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.trim().is_empty() {
            None
        } else {
            Some(decode_line(line, idx + 1))
        }
    })
}

/// Decode the whole text, failing if any record is malformed.
///
/// The error lists every bad line, not just the first.
pub fn decode(text: &str) -> WardenResult<Vec<User>> {
    let mut users = Vec::new();
    let mut errors = Vec::new();
    for result in decode_lines(text) {
        match result {
            Ok(user) => users.push(user),
            Err(e) => errors.push(e),
        }
    }
    if errors.is_empty() {
        Ok(users)
    } else {
        Err(WardenError::Malformed(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<User> {
        vec![
            User::student("Ivan Ivanov", 1, 1, "IVBO-01-21").unwrap(),
            User::teacher("Petr Petrov", 2, 2, "Computer Science").unwrap(),
            User::administrator("Sidor Sidorov", 3, 3).unwrap(),
        ]
    }

    #[test]
    fn encodes_exact_legacy_layout() {
        let text = encode(&sample());
        assert_eq!(
            text,
            "Ivan Ivanov,1,1,IVBO-01-21,student\n\
             Petr Petrov,2,2,Computer Science,teacher\n\
             Sidor Sidorov,3,3,admin\n"
        );
    }

    #[test]
    fn one_of_each_role_survives_a_round_trip() {
        let users = sample();
        let decoded = decode(&encode(&users)).unwrap();
        assert_eq!(decoded, users);
    }

    #[test]
    fn comma_in_name_does_not_round_trip() {
        let user = User::administrator("Smith, John", 9, 3).unwrap();
        let err = decode(&encode(&[user])).unwrap_err();
        match err {
            WardenError::Malformed(lines) => {
                assert_eq!(lines.len(), 1);
                assert_eq!(lines[0].line, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_lines_are_reported_individually() {
        let text = "Ann,1,1,G-1,student\n\
                    Bob,x,2,Math,teacher\n\
                    \n\
                    Root,3,3,superuser\n\
                    Eve,4,5,admin\n\
                    Kim,5,1,student\n";
        let results: Vec<_> = decode_lines(text).collect();
        assert_eq!(results.len(), 5);
        assert!(results[0].is_ok());

        let bad: Vec<LineError> = results.into_iter().filter_map(Result::err).collect();
        let lines: Vec<usize> = bad.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 4, 5, 6]);
        assert!(bad[0].reason.contains("invalid id"));
        assert!(bad[1].reason.contains("unknown type tag"));
        assert!(bad[2].reason.contains("outside 1..=3"));
        assert!(bad[3].reason.contains("expected 5 fields"));
    }

    #[test]
    fn strict_decode_fails_on_any_bad_line() {
        let text = "Ann,1,1,G-1,student\nbroken\n";
        assert!(matches!(decode(text), Err(WardenError::Malformed(e)) if e.len() == 1));
    }

    #[test]
    fn tolerates_crlf_and_blank_lines() {
        let text = "Ann,1,1,G-1,student\r\n\r\nRoot,3,3,admin\r\n";
        let users = decode(text).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].name(), "Root");
    }

    #[test]
    fn check_encodable_flags_delimiters() {
        assert!(sample().iter().all(|u| check_encodable(u).is_ok()));

        let comma_name = User::administrator("Smith, John", 9, 3).unwrap();
        assert!(matches!(
            check_encodable(&comma_name),
            Err(WardenError::Unencodable { field: "name", .. })
        ));

        let newline_dept = User::teacher("Bob", 2, 2, "Math\nPhysics").unwrap();
        assert!(matches!(
            check_encodable(&newline_dept),
            Err(WardenError::Unencodable { field: "department", value }) if value == "Math\nPhysics"
        ));
    }

    #[test]
    fn empty_subtype_field_is_rejected() {
        let err = decode_line("Ann,1,1,,student", 7).unwrap_err();
        assert_eq!(err.line, 7);
        assert!(err.reason.contains("group"));
    }
}

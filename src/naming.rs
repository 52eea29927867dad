//! Derive application and test case from log file names.
//!
//! Test runs name their logs `<exe>-<app>-...`, and logs captured during a
//! test case carry a `tc` marker:
//! `<exe>-<app>-tc-<num>-<module>-<function>.<ext>`. The application field
//! groups consecutive files into report sections; the rest labels the file
//! within its section.

/// Which part of a test run a log file belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestCase {
    /// Output captured before the first test case ran (exactly three
    /// `-`-separated name fields).
    BeforeFirst,
    /// Output of one test case, parsed from the `tc` marker form.
    Numbered {
        number: u32,
        module: String,
        function: String,
    },
    /// The name matched no recognized pattern.
    Unrecognized,
}

/// Parsed log file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogName {
    /// The file name as given.
    pub file: String,
    /// Application field, used for section grouping. Falls back to the
    /// whole file name when the name has no second field.
    pub application: String,
    pub case: TestCase,
}

impl LogName {
    pub fn parse(file_name: &str) -> Self {
        let fields: Vec<&str> = file_name.split('-').collect();

        let application = fields.get(1).copied().unwrap_or(file_name).to_string();

        let case = if fields.len() == 3 {
            TestCase::BeforeFirst
        } else if fields.len() >= 6 && fields[2] == "tc" {
            match fields[3].parse() {
                Ok(number) => {
                    // The function name may itself contain `-`; everything
                    // after the module field up to the first `.` is part
                    // of it.
                    let rest = fields[5..].join("-");
                    let function = rest.split('.').next().unwrap_or(&rest).to_string();
                    TestCase::Numbered {
                        number,
                        module: fields[4].to_string(),
                        function,
                    }
                }
                Err(_) => TestCase::Unrecognized,
            }
        } else {
            TestCase::Unrecognized
        };

        Self {
            file: file_name.to_string(),
            application,
            case,
        }
    }

    /// Human-readable per-file header line for the report.
    pub fn header(&self) -> String {
        match &self.case {
            TestCase::BeforeFirst => {
                format!("before first test case of {}", self.application)
            }
            TestCase::Numbered {
                number,
                module,
                function,
            } => format!("test case #{} {}:{}", number, module, function),
            TestCase::Unrecognized => format!("strange log file name: {}", self.file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_fields_mean_before_first_case() {
        let name = LogName::parse("x-app1-startup.log");

        assert_eq!(name.application, "app1");
        assert_eq!(name.case, TestCase::BeforeFirst);
        assert_eq!(name.header(), "before first test case of app1");
    }

    #[test]
    fn tc_marker_form_parses_all_fields() {
        let name = LogName::parse("x-app1-tc-12-mod-foo.log");

        assert_eq!(name.application, "app1");
        assert_eq!(
            name.case,
            TestCase::Numbered {
                number: 12,
                module: "mod".to_string(),
                function: "foo".to_string(),
            }
        );
        assert_eq!(name.header(), "test case #12 mod:foo");
    }

    #[test]
    fn function_keeps_dashes_and_drops_extension() {
        let name = LogName::parse("x-app1-tc-3-core-read-write.log");

        assert_eq!(
            name.case,
            TestCase::Numbered {
                number: 3,
                module: "core".to_string(),
                function: "read-write".to_string(),
            }
        );
    }

    #[test]
    fn unexpected_shapes_fall_back() {
        assert_eq!(LogName::parse("x-app1.log").case, TestCase::Unrecognized);
        assert_eq!(
            LogName::parse("x-app1-a-b-c-d.log").case,
            TestCase::Unrecognized
        );
        assert_eq!(
            LogName::parse("x-app1-tc-nan-mod-foo.log").case,
            TestCase::Unrecognized
        );
        assert_eq!(
            LogName::parse("noseparators.log").case,
            TestCase::Unrecognized
        );
    }

    #[test]
    fn application_falls_back_to_the_file_name() {
        let name = LogName::parse("noseparators.log");

        assert_eq!(name.application, "noseparators.log");
        assert_eq!(
            name.header(),
            "strange log file name: noseparators.log"
        );
    }
}

use crate::{commits::CommitRecord, pipeline::ProjectView};
use chrono::{DateTime, TimeZone, Utc};
use console::{style, Color};
use std::{borrow::Cow, fmt};

macro_rules! write_col {
    ($w:expr, $len:expr, $txt:expr) => {
        write!($w, "{:len$}", ellipsize($txt, $len as _), len = $len as _)
    };
    (, $w:expr, $len:expr, $txt:expr) => {
        write!($w, "  {:len$}", ellipsize($txt, $len as _), len = $len as _)
    };
}

const SHA_LEN: usize = 6;
const COMMIT_MSG_LEN: u8 = 60;
const AUTHOR_NAME_LEN: u8 = 20;

pub fn ellipsize(text: &str, threshold: usize) -> Cow<'_, str> {
    debug_assert!(threshold > 2);
    if text.chars().count() <= threshold {
        text.into()
    } else {
        let text: String =
            text.chars().map(|c| if c == '\n' { ' ' } else { c }).take(threshold - 2).collect();
        let text: String = text.trim().chars().chain("..".chars()).collect();
        text.into()
    }
}

#[cfg(test)]
#[test]
fn test_ellipsize() {
    use quickcheck::{quickcheck, TestResult};

    fn has_max_length_threshold(text: String, threshold: usize) -> TestResult {
        if threshold < 3 {
            return TestResult::discard();
        }
        TestResult::from_bool(ellipsize(&text, threshold).chars().count() <= threshold)
    }

    quickcheck(has_max_length_threshold as fn(_, _) -> TestResult);

    fn has_ellipsis_at_the_end(text: String, threshold: usize) -> TestResult {
        if threshold < 3 {
            return TestResult::discard();
        }
        if text.chars().count() <= threshold {
            return TestResult::discard();
        }
        let ellipsized = ellipsize(&text, threshold);
        TestResult::from_bool(ellipsized.ends_with(".."))
    }

    quickcheck(has_ellipsis_at_the_end as fn(_, _) -> TestResult);
}

/// Relative time from now.
pub trait RelativeFromNow {
    fn relative_from_now(&self) -> Since;
}

impl<T> RelativeFromNow for DateTime<T>
where
    T: TimeZone,
{
    fn relative_from_now(&self) -> Since {
        let duration = Utc::now().signed_duration_since(self.clone());
        Since(duration)
    }
}

#[derive(PartialEq, Copy, Clone, Debug)]
pub struct Since(chrono::Duration);

impl fmt::Display for Since {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = |n: i64| if n == 1 { "" } else { "s" };
        let days = self.0.num_days();
        match days {
            _ if days < 1 => {
                let hours = self.0.num_hours();
                if hours < 1 {
                    let minutes = self.0.num_minutes();
                    if minutes < 1 {
                        write!(f, "just now")
                    } else {
                        write!(f, "{minutes} minute{} ago", plural(minutes))
                    }
                } else {
                    write!(f, "{hours} hour{} ago", plural(hours))
                }
            }
            _ if days < 30 => write!(f, "{days} day{} ago", plural(days)),
            _ if days < 365 => {
                let months = days / 30;
                write!(f, "{months} month{} ago", plural(months))
            }
            _ => {
                let years = days / 365;
                write!(f, "{years} year{} ago", plural(years))
            }
        }
    }
}

#[cfg(test)]
#[test]
fn test_since() {
    use chrono::Duration;

    let since = |d: Duration| Since(d).to_string();
    assert_eq!(since(Duration::seconds(-30)), "just now");
    assert_eq!(since(Duration::seconds(30)), "just now");
    assert_eq!(since(Duration::minutes(1)), "1 minute ago");
    assert_eq!(since(Duration::hours(5)), "5 hours ago");
    assert_eq!(since(Duration::days(1)), "1 day ago");
    assert_eq!(since(Duration::days(45)), "1 month ago");
    assert_eq!(since(Duration::days(800)), "2 years ago");
}

/// Colour band of a staleness score, green when fresh, red when overdue.
pub fn staleness_color(staleness: f64) -> Color {
    match staleness {
        x if x >= 0.66 => Color::Green,
        x if x >= 0.33 => Color::Yellow,
        _ => Color::Red,
    }
}

#[cfg(test)]
#[test]
fn test_staleness_color() {
    assert_eq!(staleness_color(1.), Color::Green);
    assert_eq!(staleness_color(0.5), Color::Yellow);
    assert_eq!(staleness_color(0.01), Color::Red);
}

/// One line per commit: `[sha] message  author`.
#[derive(Debug)]
pub struct CommitLine<'a>(pub &'a CommitRecord);

impl fmt::Display for CommitLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let commit = self.0;
        let sha: String = commit.sha.chars().take(SHA_LEN).collect();
        write!(f, "[{sha}] ")?;
        write_col!(f, COMMIT_MSG_LEN, commit.message.trim())?;
        write_col!(, f, AUTHOR_NAME_LEN, &commit.author.name)?;
        Ok(())
    }
}

/// Card header of a project: name, release range, age and author of the
/// latest commit, and the staleness score when a release target is set.
#[derive(Debug)]
pub struct ProjectHeader<'a> {
    pub view: &'a ProjectView,
    pub target_interval_days: Option<f64>,
    pub name_width: usize,
}

impl fmt::Display for ProjectHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.view;
        let latest = view.latest_commit();
        let name = &view.repo().name;
        write!(f, "{}", style(format!("{name:width$}", width = self.name_width)).bold())?;
        write!(
            f,
            "  {}  {} by {}",
            view.release_range(),
            latest.date.relative_from_now(),
            latest.author.name
        )?;
        if let Some(target) = self.target_interval_days {
            let staleness = view.staleness(Some(target));
            let score = style(format!("{staleness:.2}")).fg(staleness_color(staleness));
            write!(f, "  [{score}]")?;
        }
        Ok(())
    }
}

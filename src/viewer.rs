//! Viewer context for a single request.
//!
//! The directory is browsable anonymously; a viewer carries the timezone
//! used to interpret date inputs plus the role predicates the visibility
//! checks need. Session management itself lives outside this crate.

use std::collections::HashSet;

use chrono_tz::Tz;

/// The requesting viewer, reconstructed per request.
#[derive(Debug, Clone)]
pub struct Viewer {
    /// Email address, when logged in.
    pub email: Option<String>,
    /// Whether the email address has been confirmed.
    pub email_confirmed: bool,
    /// Site-wide administrator.
    pub is_admin: bool,
    /// May create seminars and institutions.
    pub is_creator: bool,
    /// Subjects this viewer administers.
    pub admin_subjects: HashSet<String>,
    /// Timezone used to localize date inputs and rendered times.
    pub timezone: Tz,
}

impl Default for Viewer {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl Viewer {
    /// An anonymous viewer in UTC.
    pub fn anonymous() -> Self {
        Self {
            email: None,
            email_confirmed: false,
            is_admin: false,
            is_creator: false,
            admin_subjects: HashSet::new(),
            timezone: chrono_tz::UTC,
        }
    }

    /// Whether the viewer administers the given subject.
    ///
    /// `None` asks whether the viewer administers any subject at all, which
    /// gates access to organizer email addresses in search results.
    pub fn is_subject_admin(&self, subject: Option<&str>) -> bool {
        if self.is_admin {
            return true;
        }
        match subject {
            Some(code) => self.admin_subjects.contains(code),
            None => !self.admin_subjects.is_empty(),
        }
    }

    /// Whether the viewer administers any of the given subjects.
    pub fn administers_any<'a>(&self, subjects: impl IntoIterator<Item = &'a String>) -> bool {
        if self.is_admin {
            return true;
        }
        subjects
            .into_iter()
            .any(|s| self.admin_subjects.contains(s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_defaults() {
        let viewer = Viewer::anonymous();
        assert!(viewer.email.is_none());
        assert!(!viewer.is_subject_admin(None));
        assert_eq!(viewer.timezone, chrono_tz::UTC);
    }

    #[test]
    fn test_subject_admin() {
        let mut viewer = Viewer::anonymous();
        viewer.admin_subjects.insert("math".to_string());
        assert!(viewer.is_subject_admin(Some("math")));
        assert!(!viewer.is_subject_admin(Some("physics")));
        assert!(viewer.is_subject_admin(None));
    }

    #[test]
    fn test_site_admin_covers_all_subjects() {
        let viewer = Viewer {
            is_admin: true,
            ..Viewer::anonymous()
        };
        assert!(viewer.is_subject_admin(Some("bio")));
        assert!(viewer.administers_any(&["physics".to_string()]));
    }
}

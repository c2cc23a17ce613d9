//! iCalendar export for the fixed ADOS Los Angeles 2025 event

use chrono::NaiveDate;

pub const ADOS_2025_SLUG: &str = "ados-2025";
pub const ADOS_2025_PATH: &str = "/api/calendar/ados-2025.ics";
pub const ADOS_2025_FILENAME: &str = "ados-2025.ics";
pub const CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// All-day VEVENT inside its own VCALENDAR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEntry {
    pub uid: &'static str,
    pub calendar_name: &'static str,
    pub timezone: &'static str,
    pub stamp: &'static str,
    pub start: NaiveDate,
    /// Exclusive, per RFC 5545 all-day events
    pub end: NaiveDate,
    pub summary: &'static str,
    pub description: &'static str,
    pub location: &'static str,
    pub url: &'static str,
}

impl CalendarEntry {
    pub fn render(&self) -> String {
        let lines = [
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "PRODID:-//ADOS//Events//EN".to_string(),
            "CALSCALE:GREGORIAN".to_string(),
            "METHOD:PUBLISH".to_string(),
            format!("X-WR-CALNAME:{}", escape_text(self.calendar_name)),
            format!("X-WR-TIMEZONE:{}", self.timezone),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", self.uid),
            format!("DTSTAMP:{}", self.stamp),
            format!("DTSTART;VALUE=DATE:{}", self.start.format("%Y%m%d")),
            format!("DTEND;VALUE=DATE:{}", self.end.format("%Y%m%d")),
            format!("SUMMARY:{}", escape_text(self.summary)),
            format!("DESCRIPTION:{}", escape_text(self.description)),
            format!("LOCATION:{}", escape_text(self.location)),
            format!("URL:{}", self.url),
            "STATUS:CONFIRMED".to_string(),
            "SEQUENCE:0".to_string(),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ];

        let mut out = lines.join("\r\n");
        out.push_str("\r\n");
        out
    }
}

pub fn ados_2025() -> CalendarEntry {
    CalendarEntry {
        uid: "ados-2025@ados.events",
        calendar_name: "ADOS - Los Angeles",
        timezone: "America/Los_Angeles",
        stamp: "20251011T000000Z",
        start: NaiveDate::from_ymd_opt(2025, 11, 7).unwrap_or_default(),
        end: NaiveDate::from_ymd_opt(2025, 11, 8).unwrap_or_default(),
        summary: "ADOS - Los Angeles",
        description: "Morning event: 11am-5pm (panels, roundtables, hangouts)\n\n\
                      Evening event: 7pm-11pm (show, drinks, frivolities)",
        location: "Mack Sennett studios, 1215 Bates Ave, Los Angeles, CA 90029, United States",
        url: "https://ados.events/events/ados-2025",
    }
}

pub fn ados_2025_ics() -> String {
    ados_2025().render()
}

/// TEXT value escaping from RFC 5545 section 3.3.11
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ics_has_fixed_event() {
        let ics = ados_2025_ics();
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(ics.contains("UID:ados-2025@ados.events\r\n"));
        assert!(ics.contains("DTSTART;VALUE=DATE:20251107\r\n"));
        assert!(ics.contains("DTEND;VALUE=DATE:20251108\r\n"));
    }

    #[test]
    fn test_text_values_are_escaped() {
        let ics = ados_2025_ics();
        assert!(ics.contains("LOCATION:Mack Sennett studios\\, 1215 Bates Ave"));
        assert!(ics.contains("hangouts)\\n\\nEvening event"));
    }

    #[test]
    fn test_output_is_stable() {
        assert_eq!(ados_2025_ics(), ados_2025_ics());
    }
}

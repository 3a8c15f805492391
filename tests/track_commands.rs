#[cfg(test)]
mod tests {
    use tracklet::commands::track::TrackCommand;

    #[test]
    fn test_parse_short_and_long_forms() {
        assert_eq!(TrackCommand::parse("stop"), TrackCommand::Stop);
        assert_eq!(TrackCommand::parse("s"), TrackCommand::Stop);
        assert_eq!(TrackCommand::parse("resync"), TrackCommand::Resync);
        assert_eq!(TrackCommand::parse("r"), TrackCommand::Resync);
        assert_eq!(TrackCommand::parse("sync"), TrackCommand::Sync);
        assert_eq!(TrackCommand::parse("y"), TrackCommand::Sync);
        assert_eq!(TrackCommand::parse("quit"), TrackCommand::Quit);
        assert_eq!(TrackCommand::parse("q"), TrackCommand::Quit);
    }

    #[test]
    fn test_parse_is_case_and_whitespace_insensitive() {
        assert_eq!(TrackCommand::parse("  STOP \n"), TrackCommand::Stop);
        assert_eq!(TrackCommand::parse(""), TrackCommand::Empty);
        assert_eq!(TrackCommand::parse("   "), TrackCommand::Empty);
    }

    #[test]
    fn test_parse_note_keeps_text() {
        assert_eq!(
            TrackCommand::parse("note  fixing the login form "),
            TrackCommand::Note("fixing the login form".to_string())
        );
        assert_eq!(TrackCommand::parse("note"), TrackCommand::Unknown("note".to_string()));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(TrackCommand::parse("pause now"), TrackCommand::Unknown("pause now".to_string()));
    }
}

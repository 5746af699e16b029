#[cfg(test)]
mod tests {
    use crate::aggregate::FlowCounts;
    use crate::report::{format_report, ReportWriter};
    use crate::tests::temp_path;

    #[test]
    fn test_format_report_layout() {
        let mut counts = FlowCounts::new();
        counts.record("443", "tcp", "web");
        counts.record("22", "tcp", "Untagged");
        counts.record("25", "udp", "Untagged");

        let report = format_report(&counts).unwrap();

        assert_eq!(
            report,
            "Tag Counts:\n\
             \n\
             Tag,Count\n\
             Untagged,2\n\
             web,1\n\
             \n\
             Port/Protocol Combination Counts:\n\
             \n\
             Port,Protocol,Count\n\
             22,tcp,1\n\
             25,udp,1\n\
             443,tcp,1\n"
        );
    }

    #[test]
    fn test_empty_counts_render_headers_only() {
        let report = format_report(&FlowCounts::new()).unwrap();

        assert_eq!(
            report,
            "Tag Counts:\n\nTag,Count\n\nPort/Protocol Combination Counts:\n\nPort,Protocol,Count\n"
        );
    }

    #[test]
    fn test_tags_sort_by_byte_order() {
        let mut counts = FlowCounts::new();
        for tag in ["sv_P2", "email", "Untagged", "sv_P1", "SV_P1"] {
            counts.record("1", "icmp", tag);
        }

        let report = format_report(&counts).unwrap();
        let rows: Vec<&str> = report.lines().skip(3).take(5).collect();

        assert_eq!(
            rows,
            vec!["SV_P1,1", "Untagged,1", "email,1", "sv_P1,1", "sv_P2,1"]
        );
    }

    #[test]
    fn test_ports_sort_numerically_then_by_protocol() {
        let mut counts = FlowCounts::new();
        counts.record("1000", "tcp", "a");
        counts.record("80", "udp", "a");
        counts.record("80", "tcp", "a");
        counts.record("9", "unknown", "a");
        counts.record("80", "icmp", "a");

        let report = format_report(&counts).unwrap();
        let rows: Vec<&str> = report
            .lines()
            .skip_while(|line| *line != "Port,Protocol,Count")
            .skip(1)
            .collect();

        assert_eq!(
            rows,
            vec!["9,unknown,1", "80,icmp,1", "80,tcp,1", "80,udp,1", "1000,tcp,1"]
        );
    }

    #[test]
    fn test_non_numeric_ports_compare_as_text() {
        let mut counts = FlowCounts::new();
        counts.record("-", "unknown", "Untagged");
        counts.record("https", "tcp", "Untagged");
        counts.record("443", "tcp", "Untagged");
        counts.record("abc", "udp", "Untagged");

        let report = format_report(&counts).unwrap();
        let rows: Vec<&str> = report
            .lines()
            .skip_while(|line| *line != "Port,Protocol,Count")
            .skip(1)
            .collect();

        assert_eq!(
            rows,
            vec!["-,unknown,1", "443,tcp,1", "abc,udp,1", "https,tcp,1"]
        );
    }

    #[test]
    fn test_nodata_port_sorts_first() {
        let mut counts = FlowCounts::new();
        counts.record("443", "tcp", "web");
        counts.record("-", "unknown", "Untagged");
        counts.record("22", "tcp", "Untagged");

        let report = format_report(&counts).unwrap();
        let rows: Vec<&str> = report
            .lines()
            .skip_while(|line| *line != "Port,Protocol,Count")
            .skip(1)
            .collect();

        assert_eq!(rows, vec!["-,unknown,1", "22,tcp,1", "443,tcp,1"]);
    }

    #[test]
    fn test_fields_are_csv_quoted() {
        let mut counts = FlowCounts::new();
        counts.record("443", "tcp", "web, internal");
        counts.record("80", "tcp", "say \"hi\"");

        let report = format_report(&counts).unwrap();

        assert!(report.contains("\n\"say \"\"hi\"\"\",1\n"));
        assert!(report.contains("\n\"web, internal\",1\n"));
    }

    #[test]
    fn test_format_is_deterministic() {
        let mut first = FlowCounts::new();
        let mut second = FlowCounts::new();
        let flows = [
            ("443", "tcp", "web"),
            ("25", "tcp", "sv_P1"),
            ("080", "tcp", "Untagged"),
            ("80", "tcp", "Untagged"),
            ("x", "udp", "Untagged"),
            ("110", "tcp", "email"),
        ];
        for (port, protocol, tag) in flows {
            first.record(port, protocol, tag);
        }
        for (port, protocol, tag) in flows.iter().rev() {
            second.record(port, protocol, tag);
        }

        let report = format_report(&first).unwrap();

        assert_eq!(report, format_report(&second).unwrap());
        assert_eq!(report, format_report(&first).unwrap());
        assert!(report.contains("\n080,tcp,1\n80,tcp,1\n"));
    }

    #[test]
    fn test_report_writer_writes_file() {
        let mut counts = FlowCounts::new();
        counts.record("443", "tcp", "web");
        let path = temp_path("report-output.txt");

        let mut writer = ReportWriter::create(&path).unwrap();
        writer.write_report(&counts).unwrap();
        writer.flush_and_close().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(written, format_report(&counts).unwrap());
    }
}

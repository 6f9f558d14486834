use rulecheck::{check_rules_files, TracingLogger};

pub(crate) fn run(patterns: &[String]) {
    if let Err(err) = check_rules_files(TracingLogger, patterns) {
        tracing::error!(err = %err, "rules check failed");
        std::process::exit(1);
    }
}

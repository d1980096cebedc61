//! Command: print version information.

/// Print the dotlink version and the hostname used for host filtering.
pub fn run(hostname: &str) {
    println!("dotlink {}", crate::VERSION);
    println!("hostname: {hostname}");
}

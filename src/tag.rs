//! Platform CCSID tagging.
//!
//! On IBM i, files carry a CCSID attribute that tells the rest of the
//! system how to read their bytes. After a successful conversion the
//! output file is stamped through the PASE `setccsid` utility. On every
//! other host this module is a guaranteed no-op.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

/// Location of the tagging utility on an IBM i (PASE) host.
const SETCCSID: &str = "/QOpenSys/usr/bin/setccsid";

/// Whether this host supports CCSID tagging.
pub fn is_supported_platform() -> bool {
    Path::new(SETCCSID).exists()
}

/// Stamp the file with the numeric CCSID, best-effort.
///
/// Returns whether a tag was applied. Skips silently when the encoding
/// has no CCSID or the host is not IBM i. Launch failures and non-zero
/// exits are logged, never escalated - a conversion with a missing tag
/// is still a successful conversion.
pub fn set_ccsid_tag(path: &Path, ccsid: Option<u16>) -> bool {
    let Some(ccsid) = ccsid else {
        debug!("skipping CCSID tag: output encoding has no CCSID");
        return false;
    };
    if !is_supported_platform() {
        debug!("skipping CCSID tag: not an IBM i host");
        return false;
    }

    let absolute = match path.canonicalize() {
        Ok(p) => p,
        Err(err) => {
            warn!("cannot resolve '{}' for tagging: {}", path.display(), err);
            return false;
        }
    };

    debug!("setting CCSID of '{}' to {}", absolute.display(), ccsid);
    let status = Command::new(SETCCSID)
        .arg(ccsid.to_string())
        .arg(&absolute)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status();

    match status {
        Ok(rc) if rc.success() => {
            debug!("CCSID set rc=0");
            true
        }
        Ok(rc) => {
            warn!("setccsid exited with {}", rc);
            false
        }
        Err(err) => {
            warn!("failed to launch setccsid: {}", err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These assume the test host is not an IBM i system, which is what
    // every CI runner for this crate looks like.

    #[test]
    fn no_ccsid_is_a_noop() {
        assert!(!set_ccsid_tag(Path::new("/tmp/whatever"), None));
    }

    #[test]
    fn unsupported_platform_is_a_noop() {
        if is_supported_platform() {
            return;
        }
        // even a plausible CCSID must not attempt anything off-platform
        assert!(!set_ccsid_tag(Path::new("/tmp/whatever"), Some(1208)));
    }
}

/*!
 * Local-filesystem metadata bridge: translates between `RemoteFS`'s WebHDFS-style
 * attributes (owner/group names, octal permission strings, epoch timestamps,
 * replication) and `std::fs`/`libc` for `LocalFs` (spec 4.A).
 */

use std::ffi::CString;
use std::path::Path;

use filetime::{set_file_times, FileTime};

use crate::error::{DistcpError, Result};

#[cfg(unix)]
pub fn owner_name(uid: u32) -> String {
    unsafe {
        let pw = libc::getpwuid(uid);
        if pw.is_null() {
            return uid.to_string();
        }
        std::ffi::CStr::from_ptr((*pw).pw_name)
            .to_string_lossy()
            .into_owned()
    }
}

#[cfg(unix)]
pub fn group_name(gid: u32) -> String {
    unsafe {
        let gr = libc::getgrgid(gid);
        if gr.is_null() {
            return gid.to_string();
        }
        std::ffi::CStr::from_ptr((*gr).gr_name)
            .to_string_lossy()
            .into_owned()
    }
}

#[cfg(unix)]
fn uid_for_name(name: &str) -> Result<u32> {
    if let Ok(uid) = name.parse::<u32>() {
        return Ok(uid);
    }
    let cname = CString::new(name)
        .map_err(|_| DistcpError::InvalidOption(format!("invalid owner name: {name}")))?;
    unsafe {
        let pw = libc::getpwnam(cname.as_ptr());
        if pw.is_null() {
            return Err(DistcpError::InvalidOption(format!("unknown user: {name}")));
        }
        Ok((*pw).pw_uid)
    }
}

#[cfg(unix)]
fn gid_for_name(name: &str) -> Result<u32> {
    if let Ok(gid) = name.parse::<u32>() {
        return Ok(gid);
    }
    let cname = CString::new(name)
        .map_err(|_| DistcpError::InvalidOption(format!("invalid group name: {name}")))?;
    unsafe {
        let gr = libc::getgrnam(cname.as_ptr());
        if gr.is_null() {
            return Err(DistcpError::InvalidOption(format!("unknown group: {name}")));
        }
        Ok((*gr).gr_gid)
    }
}

/// `owner`/`group` accept either a name (resolved via NSS) or a plain numeric id.
#[cfg(unix)]
pub fn chown(path: &Path, owner: &str, group: &str) -> Result<()> {
    let uid = uid_for_name(owner)?;
    let gid = gid_for_name(group)?;
    let cpath = CString::new(path.as_os_str().to_string_lossy().as_bytes())
        .map_err(|_| DistcpError::InvalidOption(format!("invalid path: {}", path.display())))?;
    let rc = unsafe { libc::chown(cpath.as_ptr(), uid, gid) };
    if rc != 0 {
        return Err(DistcpError::Io(std::io::Error::last_os_error()));
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn chown(_path: &Path, _owner: &str, _group: &str) -> Result<()> {
    Ok(())
}

/// `permission` is an octal string like `"644"` or `"0755"`.
pub fn set_permission(path: &Path, permission: &str) -> Result<()> {
    let mode = u32::from_str_radix(permission.trim_start_matches('0'), 8).map_err(|_| {
        DistcpError::InvalidOption(format!("invalid permission string: {permission}"))
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    {
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_readonly(mode & 0o200 == 0);
        std::fs::set_permissions(path, perms)?;
    }
    Ok(())
}

pub fn permission_string(mode: u32) -> String {
    format!("{:o}", mode & 0o7777)
}

/// Apply access/modification timestamps, both as Unix epoch seconds.
pub fn set_times(path: &Path, access_time: i64, modification_time: i64) -> Result<()> {
    let accessed = FileTime::from_unix_time(access_time, 0);
    let modified = FileTime::from_unix_time(modification_time, 0);
    set_file_times(path, accessed, modified)?;
    Ok(())
}

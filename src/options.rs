//! rsync options and their command-line translation

use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Options passed to the rsync process
///
/// Every field defaults to "off" so a partial JSON or TOML fragment only needs
/// to name the flags it enables. [`RsyncOptions::to_args`] turns the options
/// into rsync command-line flags.
///
/// # Examples
///
/// ```
/// use rsync_task::RsyncOptions;
/// use std::ffi::OsString;
///
/// let options = RsyncOptions {
///     progress: true,
///     exclude: vec!["*.tmp".to_string()],
///     ..Default::default()
/// };
/// assert_eq!(options.to_args(), ["--progress", "--exclude=*.tmp"].map(OsString::from));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RsyncOptions {
    /// Path to the rsync executable (auto-detected if None)
    pub rsync_path: Option<PathBuf>,
    /// Whether to search PATH for rsync if `rsync_path` is not set (default: true)
    pub search_path: bool,

    /// Increase verbosity
    pub verbose: bool,
    /// Suppress non-error messages
    pub quiet: bool,
    /// Skip based on checksum, not mod-time and size
    pub checksum: bool,
    /// Archive mode; equals `-rlptgoD`
    pub archive: bool,
    /// Recurse into directories
    pub recursive: bool,
    /// Use relative path names
    pub relative: bool,
    /// Don't send implied dirs with `--relative`
    pub no_implied_dirs: bool,
    /// Skip files that are newer on the receiver
    pub update: bool,
    /// Update destination files in-place
    pub inplace: bool,
    /// Append data onto shorter files
    pub append: bool,
    /// Like `append`, but with old data in file checksum
    pub append_verify: bool,
    /// Transfer directories without recursing
    pub dirs: bool,
    /// Copy symlinks as symlinks
    pub links: bool,
    /// Transform symlink into referent file/dir
    pub copy_links: bool,
    /// Only "unsafe" symlinks are transformed
    pub copy_unsafe_links: bool,
    /// Ignore symlinks that point outside the tree
    pub safe_links: bool,
    /// Transform symlink to dir into referent dir
    pub copy_dir_links: bool,
    /// Treat symlinked dir on receiver as dir
    pub keep_dir_links: bool,
    /// Preserve hard links
    pub hard_links: bool,
    /// Preserve permissions
    pub perms: bool,
    /// Preserve executability
    pub executability: bool,
    /// Affect file and/or directory permissions, e.g. `"Du+rwx,Fgo-w"`
    pub chmod: Option<String>,
    /// Preserve ACLs
    pub acls: bool,
    /// Preserve extended attributes
    pub xattrs: bool,
    /// Preserve owner (super-user only)
    pub owner: bool,
    /// Turn off owner preservation implied by `archive`
    pub no_owner: bool,
    /// Preserve group
    pub group: bool,
    /// Turn off group preservation implied by `archive`
    pub no_group: bool,
    /// Preserve device files (super-user only)
    pub devices: bool,
    /// Preserve special files
    pub specials: bool,
    /// Preserve modification times
    pub times: bool,
    /// Omit directories from `times`
    pub omit_dir_times: bool,
    /// Handle sparse files efficiently
    pub sparse: bool,
    /// Perform a trial run with no changes made
    pub dry_run: bool,
    /// Copy files whole (without delta-transfer algorithm)
    pub whole_file: bool,
    /// Don't cross filesystem boundaries
    pub one_file_system: bool,
    /// Force a fixed checksum block-size
    pub block_size: Option<u32>,
    /// Specify the remote shell to use
    pub rsh: Option<String>,
    /// Skip creating new files on receiver
    pub existing: bool,
    /// Skip updating files that exist on receiver
    pub ignore_existing: bool,
    /// Sender removes synchronized files (non-dirs)
    pub remove_source_files: bool,
    /// Delete extraneous files from destination dirs
    pub delete: bool,
    /// Receiver deletes before transfer
    pub delete_before: bool,
    /// Receiver deletes during transfer
    pub delete_during: bool,
    /// Find deletions during, delete after
    pub delete_delay: bool,
    /// Receiver deletes after transfer
    pub delete_after: bool,
    /// Also delete excluded files from destination dirs
    pub delete_excluded: bool,
    /// Delete even if there are I/O errors
    pub ignore_errors: bool,
    /// Force deletion of directories even if not empty
    pub force: bool,
    /// Don't delete more than this many files
    pub max_delete: Option<u32>,
    /// Don't transfer any file larger than this, e.g. `"10M"`
    pub max_size: Option<String>,
    /// Don't transfer any file smaller than this
    pub min_size: Option<String>,
    /// Keep partially transferred files
    pub partial: bool,
    /// Put a partially transferred file into this directory
    pub partial_dir: Option<PathBuf>,
    /// Put all updated files into place at transfer's end
    pub delay_updates: bool,
    /// Prune empty directory chains from the file-list
    pub prune_empty_dirs: bool,
    /// Don't map uid/gid values by user/group name
    pub numeric_ids: bool,
    /// I/O timeout in seconds
    pub timeout: Option<u32>,
    /// Daemon connection timeout in seconds
    pub contimeout: Option<u32>,
    /// Don't skip files that match size and time
    pub ignore_times: bool,
    /// Skip files that match in size
    pub size_only: bool,
    /// Compare mod-times with reduced accuracy (seconds)
    pub modify_window: Option<i32>,
    /// Create temporary files in this directory
    pub temp_dir: Option<PathBuf>,
    /// Find similar file for basis if no destination file
    pub fuzzy: bool,
    /// Also compare destination files relative to this directory
    pub compare_dest: Option<PathBuf>,
    /// Like `compare_dest`, but also include copies of unchanged files
    pub copy_dest: Option<PathBuf>,
    /// Hardlink to files in this directory when unchanged
    pub link_dest: Option<PathBuf>,
    /// Compress file data during the transfer
    pub compress: bool,
    /// Explicitly set compression level
    pub compress_level: Option<u32>,
    /// Skip compressing files with these suffixes, e.g. `"gz/jpg"`
    pub skip_compress: Option<String>,
    /// Auto-ignore files in the same way CVS does
    pub cvs_exclude: bool,
    /// Give some file-transfer stats
    pub stats: bool,
    /// Output numbers in a human-readable format
    pub human_readable: bool,
    /// Show progress during transfer
    pub progress: bool,
    /// Fine-grained informational verbosity, e.g. `"progress2"`
    pub info: Option<String>,
    /// Prefer IPv4
    pub ipv4: bool,
    /// Prefer IPv6
    pub ipv6: bool,
    /// Exclude files matching these patterns
    pub exclude: Vec<String>,
    /// Don't exclude files matching these patterns
    pub include: Vec<String>,
    /// Add these file-filtering rules
    pub filter: Vec<String>,
    /// Limit socket I/O bandwidth, e.g. `"1.5m"`
    pub bwlimit: Option<String>,
    /// Specify double-colon alternate port number
    pub port: Option<u16>,
    /// Read daemon-access password from this file
    pub password_file: Option<PathBuf>,
}

impl Default for RsyncOptions {
    fn default() -> Self {
        Self {
            rsync_path: None,
            search_path: true,
            verbose: false,
            quiet: false,
            checksum: false,
            archive: false,
            recursive: false,
            relative: false,
            no_implied_dirs: false,
            update: false,
            inplace: false,
            append: false,
            append_verify: false,
            dirs: false,
            links: false,
            copy_links: false,
            copy_unsafe_links: false,
            safe_links: false,
            copy_dir_links: false,
            keep_dir_links: false,
            hard_links: false,
            perms: false,
            executability: false,
            chmod: None,
            acls: false,
            xattrs: false,
            owner: false,
            no_owner: false,
            group: false,
            no_group: false,
            devices: false,
            specials: false,
            times: false,
            omit_dir_times: false,
            sparse: false,
            dry_run: false,
            whole_file: false,
            one_file_system: false,
            block_size: None,
            rsh: None,
            existing: false,
            ignore_existing: false,
            remove_source_files: false,
            delete: false,
            delete_before: false,
            delete_during: false,
            delete_delay: false,
            delete_after: false,
            delete_excluded: false,
            ignore_errors: false,
            force: false,
            max_delete: None,
            max_size: None,
            min_size: None,
            partial: false,
            partial_dir: None,
            delay_updates: false,
            prune_empty_dirs: false,
            numeric_ids: false,
            timeout: None,
            contimeout: None,
            ignore_times: false,
            size_only: false,
            modify_window: None,
            temp_dir: None,
            fuzzy: false,
            compare_dest: None,
            copy_dest: None,
            link_dest: None,
            compress: false,
            compress_level: None,
            skip_compress: None,
            cvs_exclude: false,
            stats: false,
            human_readable: false,
            progress: false,
            info: None,
            ipv4: false,
            ipv6: false,
            exclude: Vec::new(),
            include: Vec::new(),
            filter: Vec::new(),
            bwlimit: None,
            port: None,
            password_file: None,
        }
    }
}

impl RsyncOptions {
    /// Translate the options into rsync command-line flags
    ///
    /// Flags are emitted in a fixed order, boolean switches first, then
    /// valued options, then the repeatable include/exclude/filter rules.
    /// Path values are passed through as-is, including non-UTF-8 paths.
    pub fn to_args(&self) -> Vec<OsString> {
        let switches = [
            (self.verbose, "--verbose"),
            (self.quiet, "--quiet"),
            (self.checksum, "--checksum"),
            (self.archive, "--archive"),
            (self.recursive, "--recursive"),
            (self.relative, "--relative"),
            (self.no_implied_dirs, "--no-implied-dirs"),
            (self.update, "--update"),
            (self.inplace, "--inplace"),
            (self.append, "--append"),
            (self.append_verify, "--append-verify"),
            (self.dirs, "--dirs"),
            (self.links, "--links"),
            (self.copy_links, "--copy-links"),
            (self.copy_unsafe_links, "--copy-unsafe-links"),
            (self.safe_links, "--safe-links"),
            (self.copy_dir_links, "--copy-dirlinks"),
            (self.keep_dir_links, "--keep-dirlinks"),
            (self.hard_links, "--hard-links"),
            (self.perms, "--perms"),
            (self.executability, "--executability"),
            (self.acls, "--acls"),
            (self.xattrs, "--xattrs"),
            (self.owner, "--owner"),
            (self.no_owner, "--no-owner"),
            (self.group, "--group"),
            (self.no_group, "--no-group"),
            (self.devices, "--devices"),
            (self.specials, "--specials"),
            (self.times, "--times"),
            (self.omit_dir_times, "--omit-dir-times"),
            (self.sparse, "--sparse"),
            (self.dry_run, "--dry-run"),
            (self.whole_file, "--whole-file"),
            (self.one_file_system, "--one-file-system"),
            (self.existing, "--existing"),
            (self.ignore_existing, "--ignore-existing"),
            (self.remove_source_files, "--remove-source-files"),
            (self.delete, "--delete"),
            (self.delete_before, "--delete-before"),
            (self.delete_during, "--delete-during"),
            (self.delete_delay, "--delete-delay"),
            (self.delete_after, "--delete-after"),
            (self.delete_excluded, "--delete-excluded"),
            (self.ignore_errors, "--ignore-errors"),
            (self.force, "--force"),
            (self.partial, "--partial"),
            (self.delay_updates, "--delay-updates"),
            (self.prune_empty_dirs, "--prune-empty-dirs"),
            (self.numeric_ids, "--numeric-ids"),
            (self.ignore_times, "--ignore-times"),
            (self.size_only, "--size-only"),
            (self.fuzzy, "--fuzzy"),
            (self.compress, "--compress"),
            (self.cvs_exclude, "--cvs-exclude"),
            (self.stats, "--stats"),
            (self.human_readable, "--human-readable"),
            (self.progress, "--progress"),
            (self.ipv4, "--ipv4"),
            (self.ipv6, "--ipv6"),
        ];

        let mut args: Vec<OsString> = switches
            .iter()
            .filter(|(enabled, _)| *enabled)
            .map(|(_, flag)| OsString::from(*flag))
            .collect();

        let valued = [
            ("--chmod", text_value(&self.chmod)),
            ("--block-size", number_value(self.block_size)),
            ("--rsh", text_value(&self.rsh)),
            ("--max-delete", number_value(self.max_delete)),
            ("--max-size", text_value(&self.max_size)),
            ("--min-size", text_value(&self.min_size)),
            ("--partial-dir", path_value(&self.partial_dir)),
            ("--timeout", number_value(self.timeout)),
            ("--contimeout", number_value(self.contimeout)),
            ("--modify-window", number_value(self.modify_window)),
            ("--temp-dir", path_value(&self.temp_dir)),
            ("--compare-dest", path_value(&self.compare_dest)),
            ("--copy-dest", path_value(&self.copy_dest)),
            ("--link-dest", path_value(&self.link_dest)),
            ("--compress-level", number_value(self.compress_level)),
            ("--skip-compress", text_value(&self.skip_compress)),
            ("--info", text_value(&self.info)),
            ("--bwlimit", text_value(&self.bwlimit)),
            ("--port", number_value(self.port)),
            ("--password-file", path_value(&self.password_file)),
        ];

        args.extend(
            valued
                .into_iter()
                .filter_map(|(flag, value)| value.map(|value| flag_with_value(flag, value))),
        );

        args.extend(self.include.iter().map(|p| flag_with_value("--include", p)));
        args.extend(self.exclude.iter().map(|p| flag_with_value("--exclude", p)));
        args.extend(self.filter.iter().map(|r| flag_with_value("--filter", r)));

        args
    }
}

/// `--flag=value` without converting `value` to UTF-8
fn flag_with_value(flag: &str, value: impl AsRef<OsStr>) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push("=");
    arg.push(value);
    arg
}

fn path_value(path: &Option<PathBuf>) -> Option<OsString> {
    path.as_ref().map(|p| p.as_os_str().to_owned())
}

fn text_value(text: &Option<String>) -> Option<OsString> {
    text.as_ref().map(OsString::from)
}

fn number_value<T: ToString>(number: Option<T>) -> Option<OsString> {
    number.map(|n| OsString::from(n.to_string()))
}

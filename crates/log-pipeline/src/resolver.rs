//! 로그 파일 탐색
//!
//! 설정된 루트 디렉토리마다 대상 날짜의 로그 파일 후보를 찾습니다.
//!
//! 루트별 탐색 순서:
//! 1. 정확한 날짜 파일명: `{prefix}-{date}.log`, `{prefix}-{date}.jsonl`
//! 2. 날짜 포함 와일드카드: `*{date}*.log`, `*{date}*.jsonl`
//! 3. 접두사 와일드카드: `{prefix}*.log`, `{prefix}*.jsonl`
//!
//! 루트는 glob 패턴일 수 있습니다 (`~/.openclaw/logs-*`). 일치하는 디렉토리마다 같은 순서로 찾습니다.
//! 결과는 합쳐서 중복을 제거합니다. 존재하지 않는 루트는 에러 없이 생략됩니다.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{Days, Local, NaiveDate};
use tracing::{debug, warn};

use crate::error::LogPipelineError;

/// 날짜 형식
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 루트 하나의 탐색 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoot {
    /// 설정에 적힌 원본 루트
    pub root: String,
    /// `~`와 환경변수를 확장한 경로
    pub expanded: PathBuf,
    /// 발견된 파일 (발견 순서)
    pub files: Vec<PathBuf>,
}

/// 전체 탐색 결과
///
/// 파일이 하나도 없는 루트는 포함되지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLogs {
    roots: Vec<ResolvedRoot>,
}

impl ResolvedLogs {
    /// 루트별 결과
    pub fn roots(&self) -> &[ResolvedRoot] {
        &self.roots
    }

    /// 모든 파일을 루트 순서대로 순회합니다.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.roots
            .iter()
            .flat_map(|r| r.files.iter().map(PathBuf::as_path))
    }

    /// 발견된 파일 수
    pub fn file_count(&self) -> usize {
        self.roots.iter().map(|r| r.files.len()).sum()
    }

    /// 로그 누락 여부 (파일이 하나도 없음)
    pub fn is_empty(&self) -> bool {
        self.file_count() == 0
    }
}

/// 날짜 기반 로그 경로 탐색기
#[derive(Debug, Clone)]
pub struct PathResolver {
    file_prefix: String,
}

impl PathResolver {
    /// 파일 접두사로 탐색기를 생성합니다.
    pub fn new(file_prefix: impl Into<String>) -> Self {
        Self {
            file_prefix: file_prefix.into(),
        }
    }

    /// 루트 목록에서 대상 날짜의 로그 파일을 찾습니다.
    ///
    /// 여러 루트에서 같은 파일이 발견되면 처음 한 번만 포함합니다.
    pub fn resolve(
        &self,
        roots: &[String],
        target_date: NaiveDate,
    ) -> Result<ResolvedLogs, LogPipelineError> {
        let date = target_date.format(DATE_FORMAT).to_string();
        let mut seen = HashSet::new();
        let mut resolved = ResolvedLogs::default();

        for root in roots {
            let expanded = expand_path(root);
            let dirs = root_dirs(&expanded);
            if dirs.is_empty() {
                debug!(root = %root, path = %expanded.display(), "log root does not exist, skipping");
                continue;
            }

            let mut files = Vec::new();
            for dir in &dirs {
                for pattern in self.patterns(dir, &date) {
                    for path in glob_files(&pattern)? {
                        if seen.insert(path.clone()) {
                            files.push(path);
                        }
                    }
                }
            }

            if files.is_empty() {
                debug!(root = %root, date = %date, "no log files under root");
                continue;
            }

            debug!(root = %root, count = files.len(), "resolved log files");
            resolved.roots.push(ResolvedRoot {
                root: root.clone(),
                expanded,
                files,
            });
        }

        Ok(resolved)
    }

    /// 루트 하나에 대한 glob 패턴 목록 (탐색 순서)
    pub fn patterns(&self, root: &Path, date: &str) -> Vec<String> {
        let base = glob::Pattern::escape(&root.to_string_lossy());
        let prefix = &self.file_prefix;
        vec![
            format!("{base}/{prefix}-{date}.log"),
            format!("{base}/{prefix}-{date}.jsonl"),
            format!("{base}/*{date}*.log"),
            format!("{base}/*{date}*.jsonl"),
            format!("{base}/{prefix}*.log"),
            format!("{base}/{prefix}*.jsonl"),
        ]
    }
}

/// 루트가 가리키는 디렉토리 목록
///
/// 존재하는 디렉토리는 글자 그대로 사용하고, 그렇지 않으면 루트 자체를 glob 패턴으로
/// 펼쳐 일치하는 디렉토리를 이름순으로 반환합니다.
fn root_dirs(expanded: &Path) -> Vec<PathBuf> {
    if expanded.is_dir() {
        return vec![expanded.to_path_buf()];
    }

    let pattern = expanded.to_string_lossy();
    if !pattern.contains(['*', '?', '[']) {
        return Vec::new();
    }

    let entries = match glob::glob(&pattern) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(root = %pattern, error = %e, "invalid log root pattern, skipping");
            return Vec::new();
        }
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) if path.is_dir() => Some(path),
            Ok(_) => None,
            Err(e) => {
                warn!(root = %pattern, error = %e, "unreadable log root entry, skipping");
                None
            }
        })
        .collect();
    dirs.sort();
    dirs
}

/// 패턴에 일치하는 일반 파일을 반환합니다.
fn glob_files(pattern: &str) -> Result<Vec<PathBuf>, LogPipelineError> {
    let paths = glob::glob(pattern).map_err(|e| LogPipelineError::Pattern {
        pattern: pattern.to_owned(),
        reason: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!(pattern, error = %e, "unreadable glob entry, skipping"),
        }
    }
    Ok(files)
}

/// `~`와 `$VAR`/`${VAR}`를 확장합니다.
///
/// 정의되지 않은 환경변수는 원문 그대로 남습니다.
pub fn expand_path(raw: &str) -> PathBuf {
    let expanded = expand_env_vars(raw.trim());

    if let Some(home) = dirs::home_dir() {
        if expanded == "~" {
            return home;
        }
        if let Some(rest) = expanded.strip_prefix("~/") {
            return home.join(rest);
        }
    }

    PathBuf::from(expanded)
}

fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                let name = &braced[..end];
                match std::env::var(name) {
                    Ok(value) => out.push_str(&value),
                    Err(_) => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &braced[end + 1..];
                continue;
            }
            out.push('$');
            rest = after;
            continue;
        }

        let name_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if name_len == 0 {
            out.push('$');
            rest = after;
            continue;
        }

        let name = &after[..name_len];
        match std::env::var(name) {
            Ok(value) => out.push_str(&value),
            Err(_) => {
                out.push('$');
                out.push_str(name);
            }
        }
        rest = &after[name_len..];
    }

    out.push_str(rest);
    out
}

/// 기본 대상 날짜 (로컬 기준 어제)
pub fn default_target_date() -> NaiveDate {
    let today = Local::now().date_naive();
    today.checked_sub_days(Days::new(1)).unwrap_or(today)
}

/// `YYYY-MM-DD` 문자열을 날짜로 파싱합니다.
pub fn parse_target_date(value: &str) -> Result<NaiveDate, LogPipelineError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| LogPipelineError::InvalidDate(value.to_owned()))
}

/// 디렉토리에서 이름순으로 가장 뒤에 오는 `*.log` 파일을 찾습니다.
pub fn latest_log_file(dir: &Path) -> Result<Option<PathBuf>, LogPipelineError> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let pattern = format!("{}/*.log", glob::Pattern::escape(&dir.to_string_lossy()));
    let files = glob_files(&pattern)?;
    Ok(files.into_iter().max_by(|a, b| a.file_name().cmp(&b.file_name())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "{}\n").unwrap();
        path
    }

    fn file_names(resolved: &ResolvedLogs) -> Vec<String> {
        resolved
            .files()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn resolves_exact_wildcard_and_catch_all() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "openclaw-2024-01-15.log");
        touch(dir.path(), "openclaw-2024-01-15.jsonl");
        touch(dir.path(), "agent-2024-01-15-part2.log");
        touch(dir.path(), "openclaw-old.log");
        touch(dir.path(), "notes.txt");

        let roots = vec![dir.path().to_string_lossy().into_owned()];
        let resolved = PathResolver::new("openclaw").resolve(&roots, date()).unwrap();
        let names = file_names(&resolved);

        assert_eq!(names[0], "openclaw-2024-01-15.log");
        assert_eq!(names[1], "openclaw-2024-01-15.jsonl");
        assert!(names.contains(&"agent-2024-01-15-part2.log".to_owned()));
        assert!(names.contains(&"openclaw-old.log".to_owned()));
        assert!(!names.contains(&"notes.txt".to_owned()));
        assert_eq!(resolved.file_count(), 4, "matches must be de-duplicated");
    }

    #[test]
    fn directories_matching_pattern_are_ignored() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("openclaw-archive.log")).unwrap();
        let roots = vec![dir.path().to_string_lossy().into_owned()];
        let resolved = PathResolver::new("openclaw").resolve(&roots, date()).unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn nonexistent_root_is_omitted() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "openclaw-2024-01-15.log");
        let roots = vec![
            "/nonexistent/clawmon/logs".to_owned(),
            dir.path().to_string_lossy().into_owned(),
        ];
        let resolved = PathResolver::new("openclaw").resolve(&roots, date()).unwrap();
        assert_eq!(resolved.roots().len(), 1);
        assert_eq!(resolved.file_count(), 1);
    }

    #[test]
    fn empty_root_signals_missing_logs() {
        let dir = TempDir::new().unwrap();
        let roots = vec![dir.path().to_string_lossy().into_owned()];
        let resolved = PathResolver::new("openclaw").resolve(&roots, date()).unwrap();
        assert!(resolved.is_empty());
        assert!(resolved.roots().is_empty());
    }

    #[test]
    fn same_file_under_two_roots_is_listed_once() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "openclaw-2024-01-15.log");
        let root = dir.path().to_string_lossy().into_owned();
        let resolved = PathResolver::new("openclaw")
            .resolve(&[root.clone(), root], date())
            .unwrap();
        assert_eq!(resolved.file_count(), 1);
    }

    #[test]
    fn root_with_glob_metacharacters_is_escaped() {
        let dir = TempDir::new().unwrap();
        let odd = dir.path().join("logs[1]");
        fs::create_dir(&odd).unwrap();
        touch(&odd, "openclaw-2024-01-15.log");
        let roots = vec![odd.to_string_lossy().into_owned()];
        let resolved = PathResolver::new("openclaw").resolve(&roots, date()).unwrap();
        assert_eq!(resolved.file_count(), 1);
    }

    #[test]
    fn wildcard_root_expands_to_matching_directories() {
        let dir = TempDir::new().unwrap();
        for name in ["logs-a", "logs-b"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        touch(&dir.path().join("logs-a"), "openclaw-2024-01-15.log");
        touch(&dir.path().join("logs-b"), "openclaw-2024-01-15.jsonl");
        touch(dir.path(), "logs-c");

        let roots = vec![dir.path().join("logs-*").to_string_lossy().into_owned()];
        let resolved = PathResolver::new("openclaw").resolve(&roots, date()).unwrap();

        assert_eq!(resolved.roots().len(), 1);
        assert_eq!(
            file_names(&resolved),
            vec!["openclaw-2024-01-15.log", "openclaw-2024-01-15.jsonl"]
        );
    }

    #[test]
    fn wildcard_root_without_matches_is_omitted() {
        let dir = TempDir::new().unwrap();
        let roots = vec![dir.path().join("missing-*").to_string_lossy().into_owned()];
        let resolved = PathResolver::new("openclaw").resolve(&roots, date()).unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn expand_path_handles_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_path("~"), home);
        assert_eq!(expand_path("~/.openclaw/logs"), home.join(".openclaw/logs"));
        assert_eq!(expand_path("/var/log"), PathBuf::from("/var/log"));
    }

    #[test]
    #[serial_test::serial]
    fn expand_path_handles_env_vars() {
        // SAFETY: serial 테스트로 환경변수 동시 접근이 없습니다.
        unsafe { std::env::set_var("CLAWMON_TEST_LOG_ROOT", "/srv/openclaw") };
        assert_eq!(
            expand_path("$CLAWMON_TEST_LOG_ROOT/logs"),
            PathBuf::from("/srv/openclaw/logs")
        );
        assert_eq!(
            expand_path("${CLAWMON_TEST_LOG_ROOT}-x"),
            PathBuf::from("/srv/openclaw-x")
        );
        unsafe { std::env::remove_var("CLAWMON_TEST_LOG_ROOT") };
    }

    #[test]
    fn unknown_env_var_is_left_untouched() {
        assert_eq!(
            expand_env_vars("$CLAWMON_SURELY_UNDEFINED_VAR/x"),
            "$CLAWMON_SURELY_UNDEFINED_VAR/x"
        );
        assert_eq!(expand_env_vars("cost: $5"), "cost: $5");
        assert_eq!(expand_env_vars("trailing $"), "trailing $");
    }

    #[test]
    fn parse_target_date_accepts_iso_and_rejects_garbage() {
        assert_eq!(parse_target_date("2024-01-15").unwrap(), date());
        assert!(matches!(
            parse_target_date("15/01/2024"),
            Err(LogPipelineError::InvalidDate(_))
        ));
    }

    #[test]
    fn default_target_date_is_yesterday() {
        let today = Local::now().date_naive();
        assert_eq!(default_target_date(), today.pred_opt().unwrap());
    }

    #[test]
    fn latest_log_file_picks_greatest_name() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "openclaw-2024-01-14.log");
        touch(dir.path(), "openclaw-2024-01-16.log");
        touch(dir.path(), "openclaw-2024-01-15.log");
        touch(dir.path(), "zzz.txt");
        let latest = latest_log_file(dir.path()).unwrap().unwrap();
        assert!(latest.ends_with("openclaw-2024-01-16.log"));
    }

    #[test]
    fn latest_log_file_missing_dir_is_none() {
        assert!(
            latest_log_file(Path::new("/nonexistent/clawmon"))
                .unwrap()
                .is_none()
        );
    }
}

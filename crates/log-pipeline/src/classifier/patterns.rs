//! 분류기 정규식 모음
//!
//! 분류기 생성 시 한 번 컴파일되어 모든 라인에 재사용됩니다.

use regex::Regex;

/// ANSI 색상 이스케이프
const ANSI_ESCAPE: &str = r"\x1b\[[0-9;]*m";
/// 실행 식별자
const RUN_ID: &str = r"runId=([a-f0-9\-]+)";
/// 세션 식별자
const SESSION_ID: &str = r"sessionId=([a-f0-9\-]+)";
/// `req <method>` / `res <method>` 토큰
const REQ_RES_METHOD: &str = r"\b(req|res)\b\s+([a-zA-Z][\w./:-]+)";
/// `method=<name>`
const METHOD_PARAM: &str = r"\bmethod=([a-zA-Z][\w./:-]+)";

/// 컴파일된 분류기 정규식
#[derive(Debug, Clone)]
pub struct ClassifierPatterns {
    ansi: Regex,
    run_id: Regex,
    session_id: Regex,
    req_res: Regex,
    method_param: Regex,
}

impl ClassifierPatterns {
    /// 모든 패턴을 컴파일합니다.
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            ansi: Regex::new(ANSI_ESCAPE)?,
            run_id: Regex::new(RUN_ID)?,
            session_id: Regex::new(SESSION_ID)?,
            req_res: Regex::new(REQ_RES_METHOD)?,
            method_param: Regex::new(METHOD_PARAM)?,
        })
    }

    /// ANSI 색상 이스케이프를 제거합니다.
    pub fn strip_ansi(&self, text: &str) -> String {
        self.ansi.replace_all(text, "").into_owned()
    }

    /// 메시지에서 `runId=` 값을 추출합니다.
    pub fn run_id<'a>(&self, message: &'a str) -> Option<&'a str> {
        capture(&self.run_id, message, 1)
    }

    /// 메시지에서 `sessionId=` 값을 추출합니다.
    pub fn session_id<'a>(&self, message: &'a str) -> Option<&'a str> {
        capture(&self.session_id, message, 1)
    }

    /// `req`/`res` 뒤의 메서드 이름
    pub fn req_res_method<'a>(&self, message: &'a str) -> Option<&'a str> {
        capture(&self.req_res, message, 2)
    }

    /// `method=` 파라미터 값
    pub fn method_param<'a>(&self, message: &'a str) -> Option<&'a str> {
        capture(&self.method_param, message, 1)
    }
}

fn capture<'a>(re: &Regex, text: &'a str, group: usize) -> Option<&'a str> {
    re.captures(text)
        .and_then(|caps| caps.get(group))
        .map(|m| m.as_str())
}

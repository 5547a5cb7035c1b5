// ==========================================
// 灌装线排产系统 - 统一响应结构
// ==========================================
// 形状: { ok, error?, errorKind?, ...payload }
// ==========================================

use crate::api::error::ApiResult;
use serde::Serialize;
use serde_json::json;

/// 操作响应（返回给调用方）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    /// 成功时的负载字段平铺到顶层
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
}

impl<T: Serialize> ActionResponse<T> {
    pub fn success(payload: T) -> Self {
        Self {
            ok: true,
            error: None,
            error_kind: None,
            payload: Some(payload),
        }
    }

    pub fn failure(error: String, error_kind: &str) -> Self {
        Self {
            ok: false,
            error: Some(error),
            error_kind: Some(error_kind.to_string()),
            payload: None,
        }
    }

    /// 序列化为 JSON 字符串
    ///
    /// 负载无法序列化时返回 Internal 失败响应（错误文本经 JSON 转义）
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!(error = %e, "响应序列化失败");
            json!({
                "ok": false,
                "error": format!("响应序列化失败: {}", e),
                "errorKind": "Internal",
            })
            .to_string()
        })
    }
}

impl<T: Serialize> From<ApiResult<T>> for ActionResponse<T> {
    fn from(result: ApiResult<T>) -> Self {
        match result {
            Ok(payload) => ActionResponse::success(payload),
            Err(err) => {
                tracing::debug!(kind = err.kind(), error = %err, "操作失败");
                ActionResponse::failure(err.to_string(), err.kind())
            }
        }
    }
}

/// 删除/撤销类操作的负载
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Removed {
    pub removed: bool,
}

/// 清除冲突的负载
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cleared {
    pub cleared: bool,
}

/// 导出负载
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exported {
    pub json: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ApiError;
    use crate::engine::error::ScheduleError;
    use serde_json::json;

    #[test]
    fn test_success_flattens_payload() {
        let resp: ActionResponse<Removed> = Ok(Removed { removed: true }).into();
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({ "ok": true, "removed": true })
        );
    }

    #[test]
    fn test_failure_shape() {
        let result: ApiResult<Removed> =
            Err(ApiError::from(ScheduleError::OrderNotFound("o-1".into())));
        let resp = ActionResponse::from(result);
        let value: serde_json::Value = serde_json::from_str(&resp.to_json()).unwrap();
        assert_eq!(value["ok"], json!(false));
        assert_eq!(value["errorKind"], json!("NotFound"));
        assert_eq!(value["error"], json!("订单不存在: o-1"));
    }

    /// 序列化必然失败、且错误文本带引号的负载
    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom(r#"bad "quoted" \ value"#))
        }
    }

    #[test]
    fn test_serialization_failure_is_valid_json() {
        let resp = ActionResponse::success(Unserializable);
        let value: serde_json::Value =
            serde_json::from_str(&resp.to_json()).expect("回退响应必须是合法 JSON");
        assert_eq!(value["ok"], json!(false));
        assert_eq!(value["errorKind"], json!("Internal"));
        assert!(value["error"].as_str().unwrap().contains(r#""quoted""#));
    }
}

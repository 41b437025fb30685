//! 构建期配置
//!
//! 通过环境变量在编译时注入服务端地址，未设置时指向本地开发后端。

/// API 根地址（不含尾部斜杠后的资源路径）
pub const API_BASE_URL: &str = match option_env!("MEDIBOOK_API_URL") {
    Some(url) => url,
    None => "http://localhost:8000/api",
};

/// 媒体文件根地址（头像等相对路径以此为前缀）
pub const MEDIA_BASE_URL: &str = match option_env!("MEDIBOOK_MEDIA_URL") {
    Some(url) => url,
    None => "http://localhost:8000",
};

/// 把服务端返回的媒体路径补全为绝对地址
///
/// 服务端可能直接返回绝对 URL（对象存储场景），此时原样透传。
pub fn media_url(path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{}{}", MEDIA_BASE_URL, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_media_paths_get_prefixed() {
        assert_eq!(
            media_url("/media/avatars/1.png"),
            format!("{}/media/avatars/1.png", MEDIA_BASE_URL)
        );
    }

    #[test]
    fn absolute_media_urls_pass_through() {
        assert_eq!(
            media_url("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }
}

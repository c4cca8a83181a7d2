//! User-facing strings in the user's chosen language

use bsky_session::{BskyError, FeedItem, Language};

pub struct Messages(pub Language);

impl Messages {
    pub fn login_ok(&self, handle: &str) -> String {
        match self.0 {
            Language::Ja => format!("ログインに成功しました！ (@{handle})"),
            Language::En => format!("Logged in as @{handle}."),
        }
    }

    pub fn logout_ok(&self) -> &'static str {
        match self.0 {
            Language::Ja => "ログアウトしました。",
            Language::En => "Logged out.",
        }
    }

    pub fn not_logged_in(&self) -> &'static str {
        match self.0 {
            Language::Ja => "ログインしていません。",
            Language::En => "You are not logged in.",
        }
    }

    pub fn post_ok(&self) -> &'static str {
        match self.0 {
            Language::Ja => "投稿に成功しました！",
            Language::En => "Posted!",
        }
    }

    pub fn timeline_header(&self) -> &'static str {
        match self.0 {
            Language::Ja => "=== Blueskyタイムライン ===",
            Language::En => "=== Bluesky timeline ===",
        }
    }

    pub fn feed_header(&self, uri: &str) -> String {
        match self.0 {
            Language::Ja => format!("=== カスタムフィード: {uri} ==="),
            Language::En => format!("=== Custom feed: {uri} ==="),
        }
    }

    pub fn saved_feeds_header(&self) -> &'static str {
        match self.0 {
            Language::Ja => "=== 保存済みカスタムフィード ===",
            Language::En => "=== Saved custom feeds ===",
        }
    }

    pub fn authored_feeds_header(&self) -> &'static str {
        match self.0 {
            Language::Ja => "=== 作成したカスタムフィード ===",
            Language::En => "=== Your custom feeds ===",
        }
    }

    pub fn known_feeds_header(&self) -> &'static str {
        match self.0 {
            Language::Ja => "保存済みフィード:",
            Language::En => "Your saved feeds:",
        }
    }

    pub fn feed_line(&self, name: &str, uri: &str) -> String {
        format!("- {name} (URI: {uri})")
    }

    pub fn item(&self, item: &FeedItem) -> String {
        match item {
            FeedItem::Post {
                author_display_name,
                author_handle,
                text,
            } => format!("{author_display_name} (@{author_handle}): {text}"),
            FeedItem::Unreadable(reason) => match self.0 {
                Language::Ja => format!("投稿の解析中にエラーが発生しました: {reason}"),
                Language::En => format!("Could not read this post: {reason}"),
            },
        }
    }

    pub fn language_set(&self) -> &'static str {
        match self.0 {
            Language::Ja => "言語を日本語に設定しました。",
            Language::En => "Language set to English.",
        }
    }

    pub fn error(&self, err: &BskyError) -> String {
        match (self.0, err) {
            (Language::Ja, BskyError::Auth(e)) => format!("ログインに失敗しました。({e})"),
            (Language::En, BskyError::Auth(e)) => format!("Login failed. ({e})"),
            (Language::Ja, BskyError::NotAuthenticated) => "先にログインしてください！".into(),
            (Language::En, BskyError::NotAuthenticated) => "Please log in first!".into(),
            (Language::Ja, BskyError::FeedResolution { .. }) => {
                format!("フィードの検索中にエラーが発生しました: {err}")
            }
            (Language::En, BskyError::FeedResolution { .. }) => {
                format!("Could not find that feed: {err}")
            }
            (Language::Ja, _) => format!("エラーが発生しました: {err}"),
            (Language::En, _) => format!("Something went wrong: {err}"),
        }
    }
}

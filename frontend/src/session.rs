//! 会话存储模块
//!
//! (token, user) 凭据对的唯一持有者。所有组件都通过这里的
//! get/set/clear 读写会话，绝不直接碰底层存储；写入以对的
//! 粒度进行，读取方永远不会看到"有 token 没 user"的中间态。
//! 存储变化通过显式的订阅通道广播（导航栏据此联动），不依赖
//! 浏览器 storage 事件。

use std::cell::RefCell;
use std::rc::Rc;

use medibook_shared::UserSummary;

/// localStorage 中的会话键
pub const KEY_TOKEN: &str = "medibook_token";
pub const KEY_USER: &str = "medibook_user";

/// 抽象键值存储接口
///
/// 浏览器实现见 `web::LocalStorage`，测试使用内存 Mock。
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> bool;
    fn remove(&self, key: &str) -> bool;
}

/// 登录身份：不透明 token 与用户摘要，二者同生共死
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserSummary,
}

type Listener = Box<dyn Fn(Option<&Session>)>;

/// 会话存储
///
/// 共享为 `Rc<SessionStore<_>>`：网关、认证守卫和导航栏
/// 使用同一个实例，写入串行发生在网络调用完成之后。
pub struct SessionStore<S: KeyValueStorage> {
    storage: S,
    listeners: RefCell<Vec<Listener>>,
}

impl<S: KeyValueStorage> SessionStore<S> {
    pub fn new(storage: S) -> Rc<Self> {
        Rc::new(Self {
            storage,
            listeners: RefCell::new(Vec::new()),
        })
    }

    /// 读取当前会话
    ///
    /// token 和 user 任一缺失（或 user 无法解析）都视为未登录。
    pub fn get(&self) -> Option<Session> {
        let token = self.storage.get(KEY_TOKEN)?;
        let raw_user = self.storage.get(KEY_USER)?;
        let user = serde_json::from_str(&raw_user).ok()?;
        Some(Session { token, user })
    }

    /// 写入会话（token 与 user 成对写入）并广播
    pub fn set(&self, session: &Session) {
        let user_json = match serde_json::to_string(&session.user) {
            Ok(json) => json,
            Err(e) => {
                log_error!("[Session] 序列化用户摘要失败: {}", e);
                return;
            }
        };
        self.storage.set(KEY_USER, &user_json);
        self.storage.set(KEY_TOKEN, &session.token);
        self.notify(Some(session));
    }

    /// 清除会话（成对删除）并广播
    pub fn clear(&self) {
        self.storage.remove(KEY_TOKEN);
        self.storage.remove(KEY_USER);
        self.notify(None);
    }

    /// 用服务端返回的新用户摘要整体替换本地副本，token 不变
    ///
    /// 会话不存在时静默忽略（调用方必然刚完成一次受保护请求）。
    pub fn replace_user(&self, user: UserSummary) {
        if let Some(session) = self.get() {
            self.set(&Session {
                token: session.token,
                user,
            });
        }
    }

    /// 订阅会话变化
    ///
    /// 每次 set/clear 后以新值回调。订阅与应用同生命周期，
    /// 不提供退订。
    pub fn subscribe(&self, listener: impl Fn(Option<&Session>) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    fn notify(&self, session: Option<&Session>) {
        for listener in self.listeners.borrow().iter() {
            listener(session);
        }
    }
}

// =========================================================
// 测试环境实现 (Mock)
// =========================================================

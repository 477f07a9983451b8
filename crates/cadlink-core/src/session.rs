//! 后台连接会话
//!
//! 探测过程会阻塞数秒（等待宿主启动），因此 `ConnectionManager` 运行在专用工作线程中，
//! 界面通过消息通道发送请求并轮询回复：
//! - 请求按顺序逐个处理，连接与断开天然互斥
//! - COM 对象绑定在创建它的线程上，所以注册表由工厂闭包在工作线程内创建
//! - 不支持取消：已开始的探测总会执行完毕

use crate::config::ConnectionConfig;
use crate::connection::{ConnectionManager, NOT_CONNECTED_MESSAGE};
use crate::error::{CadError, HostError};
use crate::host::HostRegistry;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info};

/// 发给工作线程的请求
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Connect,
    Disconnect,
    DrawLine { x1: f64, y1: f64, x2: f64, y2: f64 },
    SendCommand(String),
    DocumentInfo,
    ZoomExtents,
    Shutdown,
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::Connect => "Connect",
            Request::Disconnect => "Disconnect",
            Request::DrawLine { .. } => "DrawLine",
            Request::SendCommand(_) => "SendCommand",
            Request::DocumentInfo => "DocumentInfo",
            Request::ZoomExtents => "ZoomExtents",
            Request::Shutdown => "Shutdown",
        }
    }
}

/// 工作线程的回复
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// 连接成功，附带应用名称
    Connected(String),
    ConnectFailed(CadError),
    Disconnected,
    LineDrawn,
    /// 命令已送出（不含附加的换行）
    CommandSent(String),
    /// 文档信息文本（未连接或读取失败时为描述文字）
    DocumentInfo(String),
    Zoomed,
    /// 宿主绑定无法初始化，会话不可用
    Unavailable(HostError),
    /// 操作失败，连接状态不变
    Failed {
        request: &'static str,
        error: CadError,
    },
}

/// 后台连接会话
pub struct Session {
    requests: Sender<Request>,
    replies: Receiver<Reply>,
    worker: Option<JoinHandle<()>>,
}

impl Session {
    /// 启动工作线程
    ///
    /// `factory` 在工作线程中创建注册表；`notify` 在每条回复发出后调用，
    /// 界面可借此请求重绘。
    pub fn spawn<R, F, N>(config: ConnectionConfig, factory: F, notify: N) -> std::io::Result<Self>
    where
        R: HostRegistry,
        F: FnOnce() -> Result<R, HostError> + Send + 'static,
        N: Fn() + Send + 'static,
    {
        let (request_tx, request_rx) = channel::unbounded();
        let (reply_tx, reply_rx) = channel::unbounded();

        let worker = std::thread::Builder::new()
            .name("cadlink-session".to_string())
            .spawn(move || {
                let outbox = Outbox {
                    replies: reply_tx,
                    notify,
                };

                match factory() {
                    Ok(registry) => {
                        let manager = ConnectionManager::new(registry, config);
                        serve(manager, &request_rx, &outbox);
                    }
                    Err(e) => {
                        error!("CAD host binding unavailable: {}", e);
                        outbox.send(Reply::Unavailable(e.clone()));
                        refuse(&e, &request_rx, &outbox);
                    }
                }

                debug!("Session worker stopped");
            })?;

        Ok(Self {
            requests: request_tx,
            replies: reply_rx,
            worker: Some(worker),
        })
    }

    /// 发送请求；工作线程已退出时返回 false
    pub fn send(&self, request: Request) -> bool {
        self.requests.send(request).is_ok()
    }

    /// 非阻塞地取一条回复
    pub fn try_recv(&self) -> Option<Reply> {
        self.replies.try_recv().ok()
    }

    /// 最多等待 `timeout` 取一条回复
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Reply> {
        match self.replies.recv_timeout(timeout) {
            Ok(reply) => Some(reply),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// 停止工作线程并等待其释放连接
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.requests.send(Request::Shutdown);
            if worker.join().is_err() {
                error!("Session worker panicked");
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Outbox<N: Fn()> {
    replies: Sender<Reply>,
    notify: N,
}

impl<N: Fn()> Outbox<N> {
    fn send(&self, reply: Reply) -> bool {
        let delivered = self.replies.send(reply).is_ok();
        (self.notify)();
        delivered
    }
}

fn serve<R: HostRegistry, N: Fn()>(
    mut manager: ConnectionManager<R>,
    requests: &Receiver<Request>,
    outbox: &Outbox<N>,
) {
    for request in requests.iter() {
        let name = request.name();
        debug!("Session request: {}", name);
        let failed = |error: CadError| Reply::Failed {
            request: name,
            error,
        };

        let reply = match request {
            Request::Shutdown => break,
            Request::Connect => match manager.connect() {
                Ok(label) => Reply::Connected(label),
                Err(e) => Reply::ConnectFailed(e),
            },
            Request::Disconnect => {
                manager.disconnect();
                Reply::Disconnected
            }
            Request::DrawLine { x1, y1, x2, y2 } => manager
                .draw_line(x1, y1, x2, y2)
                .map_or_else(failed, |_| Reply::LineDrawn),
            Request::SendCommand(command) => match manager.send_command(&command) {
                Ok(()) => Reply::CommandSent(command),
                Err(e) => failed(e),
            },
            Request::DocumentInfo => Reply::DocumentInfo(manager.document_info_text()),
            Request::ZoomExtents => manager.zoom_extents().map_or_else(failed, |_| Reply::Zoomed),
        };

        if !outbox.send(reply) {
            break;
        }
    }

    if manager.is_connected() {
        info!("Session closing, releasing CAD host");
    }
    manager.disconnect();
}

/// 绑定不可用时，对每个请求回复失败
fn refuse<N: Fn()>(error: &HostError, requests: &Receiver<Request>, outbox: &Outbox<N>) {
    for request in requests.iter() {
        let reply = match request {
            Request::Shutdown => break,
            Request::Disconnect => Reply::Disconnected,
            Request::DocumentInfo => Reply::DocumentInfo(NOT_CONNECTED_MESSAGE.to_string()),
            Request::Connect => Reply::ConnectFailed(CadError::Host(error.clone())),
            other => Reply::Failed {
                request: other.name(),
                error: CadError::NotConnected,
            },
        };

        if !outbox.send(reply) {
            break;
        }
    }
}

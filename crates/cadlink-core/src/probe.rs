//! 宿主探测
//!
//! 按固定顺序尝试获取宿主连接，第一次成功即返回：
//!
//! 1. 附加阶段：依次对每个宿主的每个标识符尝试附加到已运行的实例
//! 2. 启动阶段：依次对每个宿主的每个标识符尝试启动新实例（设为可见）
//!
//! 默认配置下即 "附加 AutoCAD → 附加 ZWCAD → 启动 AutoCAD → 启动 ZWCAD"。
//! 单个标识符失败不会中断探测，只记录到尝试列表中。

use crate::config::{ConnectionConfig, ProbeTimings};
use crate::error::HostError;
use crate::host::{HostApplication, HostRegistry};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 探测阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbePhase {
    /// 附加到已运行的实例
    Attach,
    /// 启动新实例
    Launch,
}

impl ProbePhase {
    pub const ORDER: [ProbePhase; 2] = [ProbePhase::Attach, ProbePhase::Launch];

    pub fn name(&self) -> &'static str {
        match self {
            ProbePhase::Attach => "attach",
            ProbePhase::Launch => "launch",
        }
    }
}

/// 一次失败的探测尝试
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeAttempt {
    pub phase: ProbePhase,
    /// 宿主显示名称
    pub host: String,
    pub prog_id: String,
    /// 是否因"尚未就绪"重试过
    pub retried: bool,
    pub error: HostError,
}

/// 探测成功得到的连接句柄
pub struct Acquired<A: HostApplication> {
    pub application: A,
    pub document: A::Document,
    /// 连接的应用名称，如 "AutoCAD (AutoCAD.Application.25)"
    pub label: String,
}

/// 执行完整探测
///
/// 全部失败时返回每一次尝试的记录。
pub fn acquire<R: HostRegistry>(
    registry: &R,
    config: &ConnectionConfig,
) -> Result<Acquired<R::Application>, Vec<ProbeAttempt>> {
    let mut attempts = Vec::new();

    for phase in ProbePhase::ORDER {
        for host in &config.hosts {
            for prog_id in &host.prog_ids {
                let mut retried = false;
                let result = match phase {
                    ProbePhase::Attach => {
                        try_attach(registry, prog_id, &config.timings, &mut retried)
                    }
                    ProbePhase::Launch => try_launch(registry, prog_id, &config.timings),
                };

                match result {
                    Ok((application, document)) => {
                        let label = host.label(prog_id);
                        info!("Connected to {} via {} ({})", label, prog_id, phase.name());
                        return Ok(Acquired {
                            application,
                            document,
                            label,
                        });
                    }
                    Err(error) => {
                        debug!("{} {} failed: {}", phase.name(), prog_id, error);
                        attempts.push(ProbeAttempt {
                            phase,
                            host: host.name.clone(),
                            prog_id: prog_id.clone(),
                            retried,
                            error,
                        });
                    }
                }
            }
        }
    }

    Err(attempts)
}

type Handles<A> = (A, <A as HostApplication>::Document);

fn try_attach<R: HostRegistry>(
    registry: &R,
    prog_id: &str,
    timings: &ProbeTimings,
    retried: &mut bool,
) -> Result<Handles<R::Application>, HostError> {
    let application = match registry.attach(prog_id) {
        Ok(application) => application,
        Err(e) if e.is_unavailable() => {
            // 宿主仍在启动，只重试一次
            debug!("{} is starting up, retrying once", prog_id);
            *retried = true;
            pause(timings.unavailable_retry);
            registry.attach(prog_id)?
        }
        Err(e) => return Err(e),
    };

    pause(timings.attach_settle);
    open_document(application)
}

fn try_launch<R: HostRegistry>(
    registry: &R,
    prog_id: &str,
    timings: &ProbeTimings,
) -> Result<Handles<R::Application>, HostError> {
    let application = registry.launch(prog_id)?;

    if let Err(e) = application.set_visible(true) {
        discard(application, prog_id);
        return Err(e);
    }

    pause(timings.launch_settle);
    open_document(application)
}

/// 读取活动文档；失败时释放已获取的应用
fn open_document<A: HostApplication>(application: A) -> Result<Handles<A>, HostError> {
    match application.active_document() {
        Ok(document) => Ok((application, document)),
        Err(e) => {
            discard(application, "application");
            Err(e)
        }
    }
}

fn discard<A: HostApplication>(application: A, what: &str) {
    if let Err(e) = application.release() {
        warn!("Failed to release {}: {}", what, e);
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        std::thread::sleep(duration);
    }
}

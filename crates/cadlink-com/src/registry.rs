//! COM 宿主注册表及对象包装

use crate::apartment::Apartment;
use crate::dispatch::{point_variant, string_variant, Dispatch};
use cadlink_core::error::HostError;
use cadlink_core::host::{DrawingSpace, HostApplication, HostDocument, HostRegistry};
use cadlink_core::math::Point3;
use std::rc::Rc;
use tracing::debug;
use windows::core::{GUID, HRESULT, HSTRING, IUnknown, VARIANT};
use windows::Win32::System::Com::{CLSIDFromProgID, CoCreateInstance, IDispatch, CLSCTX_LOCAL_SERVER};
use windows::Win32::System::Ole::GetActiveObject;

/// 对象存在于运行对象表但尚未可用（宿主仍在启动）
const MK_E_UNAVAILABLE: HRESULT = HRESULT(0x800401E3_u32 as i32);

/// 基于 COM 的宿主注册表
///
/// 创建时初始化当前线程的 COM 套间，因此必须在将要使用它的线程上创建。
#[derive(Debug)]
pub struct ComRegistry {
    apartment: Rc<Apartment>,
}

impl ComRegistry {
    pub fn new() -> Result<Self, HostError> {
        Ok(Self {
            apartment: Rc::new(Apartment::enter()?),
        })
    }

    fn clsid(prog_id: &str) -> Result<GUID, HostError> {
        unsafe { CLSIDFromProgID(&HSTRING::from(prog_id)) }.map_err(|e| {
            debug!("{} is not registered: {}", prog_id, e.message());
            HostError::NotRegistered {
                prog_id: prog_id.to_string(),
            }
        })
    }

    fn wrap(&self, dispatch: Dispatch) -> ComApplication {
        ComApplication {
            dispatch,
            apartment: self.apartment.clone(),
        }
    }
}

impl HostRegistry for ComRegistry {
    type Application = ComApplication;

    fn attach(&self, prog_id: &str) -> Result<Self::Application, HostError> {
        let clsid = Self::clsid(prog_id)?;

        let mut unknown: Option<IUnknown> = None;
        unsafe { GetActiveObject(&clsid, None, &mut unknown) }.map_err(|e| {
            if e.code() == MK_E_UNAVAILABLE {
                HostError::Unavailable {
                    prog_id: prog_id.to_string(),
                }
            } else {
                HostError::call("GetActiveObject", e.message())
            }
        })?;

        let unknown = unknown.ok_or_else(|| HostError::NotRegistered {
            prog_id: prog_id.to_string(),
        })?;
        Ok(self.wrap(Dispatch::from_unknown(&unknown, "GetActiveObject")?))
    }

    fn launch(&self, prog_id: &str) -> Result<Self::Application, HostError> {
        let clsid = Self::clsid(prog_id)?;

        let dispatch: IDispatch = unsafe { CoCreateInstance(&clsid, None, CLSCTX_LOCAL_SERVER) }
            .map_err(|e| HostError::call("CoCreateInstance", e.message()))?;
        Ok(self.wrap(Dispatch::new(dispatch)))
    }
}

/// AcadApplication / ZcadApplication
#[derive(Debug)]
pub struct ComApplication {
    dispatch: Dispatch,
    apartment: Rc<Apartment>,
}

impl HostApplication for ComApplication {
    type Document = ComDocument;

    fn active_document(&self) -> Result<Self::Document, HostError> {
        Ok(ComDocument {
            dispatch: self.dispatch.get_object("ActiveDocument")?,
            apartment: self.apartment.clone(),
        })
    }

    fn name(&self) -> Result<String, HostError> {
        self.dispatch.get_string("Name")
    }

    fn version(&self) -> Result<String, HostError> {
        self.dispatch.get_string("Version")
    }

    fn set_visible(&self, visible: bool) -> Result<(), HostError> {
        self.dispatch.put("Visible", VARIANT::from(visible))
    }

    fn zoom_extents(&self) -> Result<(), HostError> {
        self.dispatch.call("ZoomExtents", Vec::new()).map(drop)
    }

    fn release(self) -> Result<(), HostError> {
        // IDispatch 在 drop 时调用 Release
        drop(self.dispatch);
        Ok(())
    }
}

/// AcadDocument
#[derive(Debug)]
pub struct ComDocument {
    dispatch: Dispatch,
    apartment: Rc<Apartment>,
}

impl HostDocument for ComDocument {
    type Space = ComModelSpace;

    fn name(&self) -> Result<String, HostError> {
        self.dispatch.get_string("Name")
    }

    fn model_space(&self) -> Result<Self::Space, HostError> {
        Ok(ComModelSpace {
            dispatch: self.dispatch.get_object("ModelSpace")?,
            _apartment: self.apartment.clone(),
        })
    }

    fn send_command(&self, text: &str) -> Result<(), HostError> {
        self.dispatch
            .call("SendCommand", vec![string_variant(text)])
            .map(drop)
    }

    fn release(self) -> Result<(), HostError> {
        drop(self.dispatch);
        Ok(())
    }
}

/// AcadModelSpace
#[derive(Debug)]
pub struct ComModelSpace {
    dispatch: Dispatch,
    _apartment: Rc<Apartment>,
}

impl DrawingSpace for ComModelSpace {
    fn add_line(&self, start: Point3, end: Point3) -> Result<(), HostError> {
        let args = vec![point_variant(start, "AddLine")?, point_variant(end, "AddLine")?];
        // 返回的直线对象不需要保留
        self.dispatch.call("AddLine", args).map(drop)
    }
}

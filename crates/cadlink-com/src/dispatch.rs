//! 按名称调用 IDispatch 成员
//!
//! AutoCAD/ZWCAD 的对象模型只暴露后期绑定接口，这里把
//! `GetIDsOfNames` + `Invoke` 包装成属性读写和方法调用。

use cadlink_core::error::HostError;
use cadlink_core::math::Point3;
use std::ptr;
use windows::core::{Interface, BSTR, GUID, HSTRING, IUnknown, PCWSTR, VARIANT};
use windows::Win32::Foundation::DISP_E_EXCEPTION;
use windows::Win32::System::Com::{
    IDispatch, DISPATCH_FLAGS, DISPATCH_METHOD, DISPATCH_PROPERTYGET, DISPATCH_PROPERTYPUT,
    DISPPARAMS, EXCEPINFO,
};
use windows::Win32::System::Ole::DISPID_PROPERTYPUT;
use windows::Win32::System::Variant::InitVariantFromDoubleArray;

const LOCALE_USER_DEFAULT: u32 = 0x0400;

/// 后期绑定的自动化对象
#[derive(Debug, Clone)]
pub(crate) struct Dispatch(IDispatch);

impl Dispatch {
    pub fn new(inner: IDispatch) -> Self {
        Self(inner)
    }

    /// 从任意 COM 对象获取 IDispatch
    pub fn from_unknown(unknown: &IUnknown, member: &str) -> Result<Self, HostError> {
        unknown
            .cast::<IDispatch>()
            .map(Self)
            .map_err(|e| HostError::call(member, e.message()))
    }

    /// 读取属性
    pub fn get(&self, name: &str) -> Result<VARIANT, HostError> {
        self.invoke(name, DISPATCH_PROPERTYGET, Vec::new())
    }

    /// 写入属性
    pub fn put(&self, name: &str, value: VARIANT) -> Result<(), HostError> {
        self.invoke(name, DISPATCH_PROPERTYPUT, vec![value]).map(drop)
    }

    /// 调用方法，参数按声明顺序给出
    pub fn call(&self, name: &str, args: Vec<VARIANT>) -> Result<VARIANT, HostError> {
        self.invoke(name, DISPATCH_METHOD, args)
    }

    pub fn get_string(&self, name: &str) -> Result<String, HostError> {
        let value = self.get(name)?;
        BSTR::try_from(&value)
            .map(|s| s.to_string())
            .map_err(|e| HostError::call(name, e.message()))
    }

    pub fn get_object(&self, name: &str) -> Result<Dispatch, HostError> {
        let value = self.get(name)?;
        let unknown = IUnknown::try_from(&value).map_err(|e| HostError::call(name, e.message()))?;
        Self::from_unknown(&unknown, name)
    }

    fn dispid(&self, name: &str) -> Result<i32, HostError> {
        let wide = HSTRING::from(name);
        let names = [PCWSTR(wide.as_ptr())];
        let mut id = 0i32;

        unsafe {
            self.0
                .GetIDsOfNames(&GUID::zeroed(), names.as_ptr(), 1, LOCALE_USER_DEFAULT, &mut id)
        }
        .map_err(|e| HostError::call(name, e.message()))?;

        Ok(id)
    }

    fn invoke(
        &self,
        name: &str,
        flags: DISPATCH_FLAGS,
        mut args: Vec<VARIANT>,
    ) -> Result<VARIANT, HostError> {
        let id = self.dispid(name)?;

        // IDispatch 要求参数逆序
        args.reverse();

        let mut named = DISPID_PROPERTYPUT;
        let is_put = flags == DISPATCH_PROPERTYPUT;
        let params = DISPPARAMS {
            rgvarg: if args.is_empty() {
                ptr::null_mut()
            } else {
                args.as_mut_ptr()
            },
            rgdispidNamedArgs: if is_put { &mut named } else { ptr::null_mut() },
            cArgs: args.len() as u32,
            cNamedArgs: u32::from(is_put),
        };

        let mut result = VARIANT::default();
        let mut exception = EXCEPINFO::default();
        let mut arg_error = 0u32;

        let outcome = unsafe {
            self.0.Invoke(
                id,
                &GUID::zeroed(),
                LOCALE_USER_DEFAULT,
                flags,
                &params,
                Some(&mut result),
                Some(&mut exception),
                Some(&mut arg_error),
            )
        };

        match outcome {
            Ok(()) => Ok(result),
            Err(e) if e.code() == DISP_E_EXCEPTION => {
                let description = exception.bstrDescription.to_string();
                let message = if description.is_empty() {
                    e.message()
                } else {
                    description
                };
                Err(HostError::call(name, message))
            }
            Err(e) => Err(HostError::call(name, e.message())),
        }
    }
}

/// 三维点转为 `VT_ARRAY | VT_R8` 变体
pub(crate) fn point_variant(point: Point3, member: &str) -> Result<VARIANT, HostError> {
    let coords = [point.x, point.y, point.z];
    unsafe { InitVariantFromDoubleArray(&coords) }.map_err(|e| HostError::call(member, e.message()))
}

pub(crate) fn string_variant(text: &str) -> VARIANT {
    VARIANT::from(BSTR::from(text))
}

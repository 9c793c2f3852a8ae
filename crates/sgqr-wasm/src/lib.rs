//! WASM bindings для SGQR
//!
//! Предоставляет JavaScript API для разбора и сборки платёжных QR-кодов.
//! Распознавание изображения с камеры выполняется на стороне JS.

use sgqr_core::render::QrRenderer;
use sgqr_core::{
    checksum, Composer, Composition, Context, MatrixRenderer, MerchantDefaults, PayNowRequest,
    QrData,
};
use wasm_bindgen::prelude::*;

/// Инициализация panic hook и логгера
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).ok();
    log::info!("SGQR WASM module initialized");
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsError::new(&e.to_string()))
}

/// Разбор текста QR как EMVCo payload
///
/// @param content - текст, распознанный из QR
/// @returns ParseResult; ошибка разбора лежит в поле `error`
#[wasm_bindgen(js_name = decode)]
pub fn decode(content: &str) -> Result<JsValue, JsError> {
    to_js(&sgqr_core::decode(Context::EmvcoMpm, content))
}

/// Полный разбор: тип контента, дерево TLV, платёжные методы, CRC
#[wasm_bindgen(js_name = inspect)]
pub fn inspect(content: &str) -> Result<JsValue, JsError> {
    to_js(&sgqr_core::inspect(content))
}

/// То же, что `inspect`, но строкой JSON (для копирования и логов)
#[wasm_bindgen(js_name = inspectJson)]
pub fn inspect_json(content: &str) -> Result<String, JsError> {
    sgqr_core::inspect(content)
        .to_json()
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Разбор JSON-строки полей и сборка payload с CRC
///
/// @param json - объект `{ "00": "01", ... }` в виде строки
#[wasm_bindgen(js_name = encodeJson)]
pub fn encode_json(json: &str) -> Result<String, JsError> {
    let data: QrData = serde_json::from_str(json).map_err(|e| JsError::new(&e.to_string()))?;
    data.encode_with_checksum().map_err(|e| JsError::new(&e.to_string()))
}

/// Сборка TLV из объекта `{ "00": "01", "26": { ... }, "04": null }`
///
/// @param fields - поля по двузначным тегам
/// @param with_checksum - добавить CRC (тег 63)
#[wasm_bindgen(js_name = encode)]
pub fn encode(fields: JsValue, with_checksum: bool) -> Result<String, JsError> {
    let data: QrData =
        serde_wasm_bindgen::from_value(fields).map_err(|e| JsError::new(&e.to_string()))?;

    let encoded = if with_checksum {
        data.encode_with_checksum()
    } else {
        data.encode()
    };
    encoded.map_err(|e| JsError::new(&e.to_string()))
}

/// Проверка CRC в конце payload
#[wasm_bindgen(js_name = verifyChecksum)]
pub fn verify_checksum(content: &str) -> Result<(), JsError> {
    checksum::verify(content).map_err(|e| JsError::new(&e.to_string()))
}

/// Матрица модулей QR для отрисовки на canvas
///
/// @returns Object `{ width, modules }`, modules - массив bool по строкам
#[wasm_bindgen(js_name = renderPayload)]
pub fn render_payload(payload: &str) -> Result<JsValue, JsError> {
    let matrix = MatrixRenderer
        .render(payload)
        .map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&matrix)
}

/// JavaScript-доступный список платёжных методов для объединения
#[wasm_bindgen]
pub struct WasmComposer {
    composer: Composer,
    composition: Composition,
}

#[wasm_bindgen]
impl WasmComposer {
    /// Создание с полями по умолчанию (SGD, Singapore)
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            composer: Composer::new(),
            composition: Composition::default(),
        }
    }

    /// Создание с пользовательскими полями верхнего уровня
    ///
    /// @param config - Object с полями MerchantDefaults (camelCase)
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<WasmComposer, JsError> {
        let defaults: MerchantDefaults =
            serde_wasm_bindgen::from_value(config).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Self {
            composer: Composer::with_config(defaults),
            composition: Composition::default(),
        })
    }

    /// Добавление методов из отсканированного QR
    #[wasm_bindgen(js_name = addScan)]
    pub fn add_scan(&mut self, content: &str) {
        self.composition = self.composition.with_scan(content);
    }

    /// Добавление PayNow по номеру телефона или UEN
    #[wasm_bindgen(js_name = addPayNow)]
    pub fn add_paynow(&mut self, destination: &str, reference: Option<String>) -> Result<(), JsError> {
        let mut request = PayNowRequest::for_destination(destination)
            .ok_or_else(|| JsError::new("Not a PayNow mobile number or UEN"))?;
        if let Some(reference) = reference {
            request = request.with_reference(reference);
        }

        let method = request
            .to_payment_method()
            .map_err(|e| JsError::new(&e.to_string()))?;
        self.composition = self.composition.with_method(method);
        Ok(())
    }

    /// Перемещение метода `index` перед методом `before`
    #[wasm_bindgen(js_name = moveItem)]
    pub fn move_item(&mut self, index: usize, before: usize) -> Result<(), JsError> {
        self.composition = self
            .composition
            .moved(index, before)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(())
    }

    /// Удаление метода
    #[wasm_bindgen(js_name = remove)]
    pub fn remove(&mut self, index: usize) -> Result<(), JsError> {
        self.composition = self
            .composition
            .removed(index)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(())
    }

    /// Текущий список методов
    #[wasm_bindgen(js_name = methods)]
    pub fn methods(&self) -> Result<JsValue, JsError> {
        to_js(&self.composition.payment_methods)
    }

    /// Протоколы методов в текущем порядке
    #[wasm_bindgen(js_name = protocols)]
    pub fn protocols(&self) -> js_sys::Array {
        self.composition
            .payment_methods
            .iter()
            .map(|m| JsValue::from_str(&m.protocol))
            .collect()
    }

    /// Итоговый payload с CRC
    #[wasm_bindgen(js_name = payload)]
    pub fn payload(&self) -> Result<String, JsError> {
        self.composer
            .payload(&self.composition)
            .map_err(|e| JsError::new(&e.to_string()))
    }
}

impl Default for WasmComposer {
    fn default() -> Self {
        Self::new()
    }
}

/// Информация о версии
#[wasm_bindgen(js_name = version)]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const PAYNOW_PAYLOAD: &str = "00020101021126370009SG.PAYNOW010120210201403121W030115204000053037025802SG5902NA6009Singapore63045132";

    #[wasm_bindgen_test]
    fn test_version() {
        let v = version();
        assert!(!v.is_empty());
    }

    #[wasm_bindgen_test]
    fn test_verify_checksum() {
        assert!(verify_checksum(PAYNOW_PAYLOAD).is_ok());
    }

    #[wasm_bindgen_test]
    fn test_inspect_json() {
        let json = inspect_json(PAYNOW_PAYLOAD).ok().unwrap_or_default();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["contentType"], "emvMpm");
        assert_eq!(value["checksumValid"], true);
        assert_eq!(value["paymentMethods"][0]["protocol"], "SG.PAYNOW");
    }

    #[wasm_bindgen_test]
    fn test_encode_json() {
        let payload = encode_json(
            r#"{"00":"01","01":"11","26":{"00":"SG.PAYNOW","01":"2","02":"201403121W","03":"1","04":null},"52":"0000","53":"702","58":"SG","59":"NA","60":"Singapore"}"#,
        );
        assert_eq!(payload.ok().as_deref(), Some(PAYNOW_PAYLOAD));
        assert!(encode_json(r#"{"1":"x"}"#).is_err());
    }

    #[wasm_bindgen_test]
    fn test_composer_round_trip() {
        let mut composer = WasmComposer::new();
        composer.add_scan(PAYNOW_PAYLOAD);
        assert_eq!(composer.protocols().length(), 1);
        assert_eq!(composer.payload().ok().as_deref(), Some(PAYNOW_PAYLOAD));
    }

    #[wasm_bindgen_test]
    fn test_add_paynow_replaces_scanned_paynow() {
        let mut composer = WasmComposer::new();
        composer.add_scan(PAYNOW_PAYLOAD);
        assert!(composer.add_paynow("91234567", None).is_ok());
        assert_eq!(composer.protocols().length(), 1);
        assert!(composer.remove(0).is_ok());
        assert_eq!(composer.protocols().length(), 0);
    }
}

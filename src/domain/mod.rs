// Domain layer: 職缺模型、分析結果、ports 以及純函式的分析引擎。
// services 底下不做任何 I/O。

pub mod model;
pub mod ports;
pub mod report;

pub mod services;

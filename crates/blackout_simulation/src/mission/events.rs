//! Mission events

use bevy::prelude::*;

/// Генератор дошёл до Activated (ровно один раз на генератор)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorActivated {
    pub generator: Entity,
}

/// Прогресс миссии для HUD: N из M генераторов
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorProgressChanged {
    pub activated: usize,
    pub total: usize,
}

/// Все генераторы запущены — можно идти к лифту (one-shot)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionReady;

/// Победа: генераторы + игрок в зоне эвакуации (one-shot)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissionCompleted;

/// Текстовая подсказка на HUD
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ShowMessage {
    pub text: String,
    pub duration: f32,
}

/// Аудио-cue генератора (фазовые переходы)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorCue {
    pub generator: Entity,
    pub kind: GeneratorCueKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorCueKind {
    /// Loop неисправности (сброс или исходное состояние)
    Fault,
    /// Начали крутить — звук запуска
    Startup,
    /// Запущен — рабочий loop
    Running,
}

//! Global declarations referenced by every generated script.

use crate::CompilerOptions;

/// Declaration file text for the `__VLS_*` helpers.
pub fn generate(options: &CompilerOptions) -> String {
    let lib = options.lib.as_str();
    format!(
        r#"export {{}};

declare global {{
	type __VLS_PickNotAny<A, B> = 0 extends 1 & A ? B : A;
	type __VLS_IntrinsicElements = import('{lib}/jsx-runtime').JSX.IntrinsicElements;
	type __VLS_GlobalComponents = import('{lib}').GlobalComponents;
	type __VLS_GlobalDirectives = import('{lib}').GlobalDirectives;
	type __VLS_ResolveDirectives<T> = {{
		[K in keyof T & string as `v${{Capitalize<K>}}`]: T[K];
	}};
	type __VLS_ElementOf<T> = T extends readonly (infer E)[] ? E : T extends Iterable<infer E> ? E : never;

	function __VLS_getVForSourceType<T extends number>(source: T): [number, number][];
	function __VLS_getVForSourceType<T extends string>(source: T): [string, number][];
	function __VLS_getVForSourceType<T extends any[]>(source: T): [T[number], number][];
	function __VLS_getVForSourceType<T extends {{ [Symbol.iterator](): Iterator<any> }}>(
		source: T,
	): [__VLS_ElementOf<T>, number][];
	function __VLS_getVForSourceType<T>(source: T): [T[keyof T], keyof T, number][];

	function __VLS_defineComponent<T>(options: T): T extends new (...args: any) => any
		? T
		: import('{lib}').DefineComponent<T>;

	function defineProps<T = unknown>(): T;
	function defineEmits<T = unknown>(): T;
	function defineExpose<T = unknown>(exposed?: T): void;
	function defineModel<T = unknown>(name?: string, options?: any): T;
	function defineSlots<T = unknown>(): T;
	function withDefaults<T, D>(props: T, defaults: D): T & D;
}}
"#
    )
}
